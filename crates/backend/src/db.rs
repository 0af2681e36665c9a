use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Set up rustls TLS configuration
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    // Parse the connection string and connect with TLS
    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    // Spawn the connection task
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    // Build the async connection from the tokio-postgres client
    AsyncPgConnection::try_from(client).await
}

/// Build the connection pool. Connections are opened lazily on first use.
pub fn establish_connection_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup =
        Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        database_url,
        manager_config,
    );
    let pool = Pool::builder(config).build()?;

    Ok(pool)
}

// Tenant membership lookups
pub mod memberships {
    use super::*;
    use crate::schema::{tenant_memberships, tenants, users};
    use diesel::{pg::Pg, sql_types::Varchar};

    /// Ids of active tenants the user `(issuer, subject)` is an active member of.
    pub async fn active_tenant_ids(
        conn: &mut AsyncPgConnection,
        issuer_val: &str,
        subject_val: &str,
    ) -> anyhow::Result<Vec<String>> {
        let ids = active_tenant_ids_query(issuer_val, subject_val)
            .load::<String>(conn)
            .await?;

        Ok(ids)
    }

    fn active_tenant_ids_query<'a>(
        issuer_val: &'a str,
        subject_val: &'a str,
    ) -> tenants::BoxedQuery<'a, Pg, Varchar> {
        let user_ids = users::table
            .filter(users::issuer.eq(issuer_val))
            .filter(users::subject.eq(subject_val))
            .select(users::id);

        let member_tenants = tenant_memberships::table
            .filter(tenant_memberships::is_active.eq(true))
            .filter(tenant_memberships::user_id.eq_any(user_ids))
            .select(tenant_memberships::tenant_id);

        tenants::table
            .filter(tenants::is_active.eq(true))
            .filter(tenants::id.eq_any(member_tenants))
            .select(tenants::id)
            .order_by(tenants::id.asc())
            .into_boxed()
    }

}

// Calendar event database operations. Every query is scoped by tenant.
pub mod calendar_events {
    use super::*;
    use crate::schema::calendar_events;
    use diesel::pg::Pg;
    use shared_types::CalendarEvent;

    pub async fn list_for_tenant(
        conn: &mut AsyncPgConnection,
        tenant: &str,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        let events = list_for_tenant_query(tenant)
            .load::<CalendarEvent>(conn)
            .await?;

        Ok(events)
    }

    fn list_for_tenant_query(tenant: &str) -> calendar_events::BoxedQuery<'_, Pg> {
        calendar_events::table
            .filter(calendar_events::tenant_id.eq(tenant))
            .order_by(calendar_events::starts_at.asc())
            .into_boxed()
    }

}

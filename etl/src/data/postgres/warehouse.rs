//! Warehouse loads and read-backs
//!
//! Every table load is replace-then-append inside one transaction: the
//! previous rows are deleted and the new batch inserted, so a failed load
//! rolls back to the prior content of that table and never leaves it half
//! written. Atomicity is per table; the run driver sequences tables.
//!
//! The SQL lives in free functions over the pool and stays in the sqlx
//! error domain; the trait impl classifies failures as warehouse errors in
//! one place.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::core::config::PostgresConfig;
use crate::data::error::DataError;
use crate::data::traits::WarehouseRepository;
use crate::data::types::{
    AccumulatedFactRow, ClientRow, CourierRow, DailyFactRow, DailyInputRow, DateDimRow,
    HourDimRow, HourlyFactRow, HourlyInputRow, IncidentFactRow, IncidentRefRow, SiteRow,
    StatusRow,
};

use super::PostgresService;
use super::schema::{DROP_SCHEMA, SCHEMA};

/// Warehouse database access
pub struct PostgresWarehouse {
    service: PostgresService,
}

impl PostgresWarehouse {
    /// Connect to the warehouse database
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DataError> {
        let service = PostgresService::init(config, DataError::from_warehouse).await?;
        Ok(Self { service })
    }

    pub async fn close(&self) {
        self.service.close().await;
    }

    fn pool(&self) -> &PgPool {
        self.service.pool()
    }
}

#[async_trait]
impl WarehouseRepository for PostgresWarehouse {
    async fn reset_schema(&self) -> Result<(), DataError> {
        rebuild_schema(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn missing_tables(&self, required: &[&str]) -> Result<Vec<String>, DataError> {
        absent_tables(self.pool(), required)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_date_dim(
        &self,
        rows: &[DateDimRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_date_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_hour_dim(
        &self,
        rows: &[HourDimRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_hour_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_client_dim(
        &self,
        rows: &[ClientRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_client_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_courier_dim(
        &self,
        rows: &[CourierRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_courier_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_site_dim(&self, rows: &[SiteRow], saved: NaiveDate) -> Result<u64, DataError> {
        replace_site_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_incident_dim(
        &self,
        rows: &[IncidentRefRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_incident_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_status_dim(
        &self,
        rows: &[StatusRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_status_dim(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_accumulated_fact(
        &self,
        rows: &[AccumulatedFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_accumulated_fact(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_hourly_fact(
        &self,
        rows: &[HourlyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_hourly_fact(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_daily_fact(
        &self,
        rows: &[DailyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_daily_fact(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn load_incident_fact(
        &self,
        rows: &[IncidentFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        replace_incident_fact(self.pool(), rows, saved)
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn read_date_keys(&self) -> Result<Vec<(i64, NaiveDate)>, DataError> {
        sqlx::query_as::<_, (i64, NaiveDate)>("SELECT key_dim_fecha, fecha FROM dim_fecha")
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn read_client_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        sqlx::query_as::<_, (i64, i64)>("SELECT key_dim_cliente, cliente_id FROM dim_cliente")
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn read_courier_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT key_dim_mensajero, mensajero_id FROM dim_mensajero",
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_warehouse)
    }

    async fn read_hour_keys(&self) -> Result<Vec<(i64, i32)>, DataError> {
        sqlx::query_as::<_, (i64, i32)>("SELECT key_dim_hora, hora FROM dim_hora")
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn read_incident_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        sqlx::query_as::<_, (i64, i64)>("SELECT key_dim_novedad, novedad_id FROM dim_novedad")
            .fetch_all(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn fetch_hourly_inputs(&self) -> Result<Vec<HourlyInputRow>, DataError> {
        hourly_inputs(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }

    async fn fetch_daily_inputs(&self) -> Result<Vec<DailyInputRow>, DataError> {
        daily_inputs(self.pool())
            .await
            .map_err(DataError::from_warehouse)
    }
}

// ============================================================================
// SCHEMA MANAGEMENT
// ============================================================================

/// Drop and recreate the whole star schema. The DDL constants are
/// multi-statement batches, so they go through the simple query protocol.
async fn rebuild_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(DROP_SCHEMA).execute(pool).await?;
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::debug!("Warehouse tables dropped and recreated");
    Ok(())
}

/// Return the subset of `required` tables that do not exist, in the order
/// they were asked for
async fn absent_tables(pool: &PgPool, required: &[&str]) -> Result<Vec<String>, sqlx::Error> {
    let wanted: Vec<String> = required.iter().map(|t| t.to_string()).collect();
    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::text FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_name = ANY($1)
        "#,
    )
    .bind(&wanted)
    .fetch_all(pool)
    .await?;

    Ok(wanted
        .into_iter()
        .filter(|t| !present.contains(t))
        .collect())
}

// ============================================================================
// DIMENSION LOADS
// ============================================================================

async fn replace_date_dim(
    pool: &PgPool,
    rows: &[DateDimRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_fecha").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_fecha (fecha, año, mes, dia, dia_semana, saved)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(row.fecha)
        .bind(row.anio)
        .bind(row.mes)
        .bind(row.dia)
        .bind(row.dia_semana)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_hour_dim(
    pool: &PgPool,
    rows: &[HourDimRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_hora").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query("INSERT INTO dim_hora (hora, periodo_dia, saved) VALUES ($1, $2, $3)")
            .bind(row.hora)
            .bind(&row.periodo_dia)
            .bind(saved)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_client_dim(
    pool: &PgPool,
    rows: &[ClientRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_cliente").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_cliente
               (cliente_id, nombre, nit_cliente, tipo_cliente, sector, email,
                telefono, direccion, nombre_contacto, ciudad, saved)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(row.cliente_id)
        .bind(&row.nombre)
        .bind(&row.nit_cliente)
        .bind(&row.tipo_cliente)
        .bind(&row.sector)
        .bind(&row.email)
        .bind(&row.telefono)
        .bind(&row.direccion)
        .bind(&row.nombre_contacto)
        .bind(&row.ciudad)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_courier_dim(
    pool: &PgPool,
    rows: &[CourierRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_mensajero").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_mensajero
               (mensajero_id, fecha_entrada, fecha_salida, ciudad_operacion, activo, saved)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(row.mensajero_id)
        .bind(row.fecha_entrada)
        .bind(row.fecha_salida)
        .bind(&row.ciudad_operacion)
        .bind(row.activo)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_site_dim(
    pool: &PgPool,
    rows: &[SiteRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_sede").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_sede
               (sede_id, nombre_sede, direccion_sede, ciudad_sede, departamento_sede, saved)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(row.sede_id)
        .bind(&row.nombre_sede)
        .bind(&row.direccion_sede)
        .bind(&row.ciudad_sede)
        .bind(&row.departamento_sede)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_incident_dim(
    pool: &PgPool,
    rows: &[IncidentRefRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_novedad").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_novedad (novedad_id, tipo_novedad_id, descripcion, saved)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(row.novedad_id)
        .bind(row.tipo_novedad_id)
        .bind(&row.descripcion)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_status_dim(
    pool: &PgPool,
    rows: &[StatusRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_estado").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO dim_estado (estado_id, nombre_estado, descripcion, saved)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(row.estado_id)
        .bind(&row.nombre_estado)
        .bind(&row.descripcion)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

// ============================================================================
// FACT LOADS
// ============================================================================

async fn replace_accumulated_fact(
    pool: &PgPool,
    rows: &[AccumulatedFactRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM hecho_entrega_acumulado")
        .execute(&mut *tx)
        .await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO hecho_entrega_acumulado
               (servicio_id, key_dim_fecha, key_dim_cliente, key_dim_mensajero, key_dim_hora,
                fecha_iniciado, hora_iniciado, fecha_asignado, hora_asignado,
                fecha_novedad, hora_novedad, fecha_ultima_novedad, hora_ultima_novedad,
                fecha_recogido, hora_recogido, fecha_entregado, hora_entregado,
                fecha_cerrado, hora_cerrado,
                tiempo_asignacion, tiempo_total_novedades, tiempo_recogida,
                tiempo_entrega, tiempo_cierre, cantidad_novedades, saved)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                       $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)"#,
        )
        .bind(row.servicio_id)
        .bind(row.key_dim_fecha)
        .bind(row.key_dim_cliente)
        .bind(row.key_dim_mensajero)
        .bind(row.key_dim_hora)
        .bind(row.fecha_iniciado)
        .bind(&row.hora_iniciado)
        .bind(row.fecha_asignado)
        .bind(&row.hora_asignado)
        .bind(row.fecha_novedad)
        .bind(&row.hora_novedad)
        .bind(row.fecha_ultima_novedad)
        .bind(&row.hora_ultima_novedad)
        .bind(row.fecha_recogido)
        .bind(&row.hora_recogido)
        .bind(row.fecha_entregado)
        .bind(&row.hora_entregado)
        .bind(row.fecha_cerrado)
        .bind(&row.hora_cerrado)
        .bind(&row.tiempo_asignacion)
        .bind(&row.tiempo_total_novedades)
        .bind(&row.tiempo_recogida)
        .bind(&row.tiempo_entrega)
        .bind(&row.tiempo_cierre)
        .bind(row.cantidad_novedades)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_hourly_fact(
    pool: &PgPool,
    rows: &[HourlyFactRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM hecho_entrega_servicio_hora")
        .execute(&mut *tx)
        .await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO hecho_entrega_servicio_hora
               (servicio_id, key_dim_fecha, key_dim_cliente, key_dim_mensajero,
                key_dim_hora, key_dim_sede, cantidad_servicios, saved)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(row.servicio_id)
        .bind(row.key_dim_fecha)
        .bind(row.key_dim_cliente)
        .bind(row.key_dim_mensajero)
        .bind(row.key_dim_hora)
        .bind(row.key_dim_sede)
        .bind(row.cantidad_servicios)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_daily_fact(
    pool: &PgPool,
    rows: &[DailyFactRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM hecho_entrega_servicio_diaria")
        .execute(&mut *tx)
        .await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO hecho_entrega_servicio_diaria
               (servicio_id, key_dim_fecha, key_dim_cliente, key_dim_mensajero,
                key_dim_sede, dia_semana, cantidad_servicios_dia, saved)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(row.servicio_id)
        .bind(row.key_dim_fecha)
        .bind(row.key_dim_cliente)
        .bind(row.key_dim_mensajero)
        .bind(row.key_dim_sede)
        .bind(row.dia_semana)
        .bind(row.cantidad_servicios_dia)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

async fn replace_incident_fact(
    pool: &PgPool,
    rows: &[IncidentFactRow],
    saved: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM hecho_novedades_servicio")
        .execute(&mut *tx)
        .await?;
    for row in rows {
        sqlx::query(
            r#"INSERT INTO hecho_novedades_servicio
               (key_dim_fecha, key_dim_cliente, key_dim_novedad,
                fecha_hora_novedad, descripcion, saved)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(row.key_dim_fecha)
        .bind(row.key_dim_cliente)
        .bind(row.key_dim_novedad)
        .bind(row.fecha_hora_novedad)
        .bind(&row.descripcion)
        .bind(saved)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

// ============================================================================
// AGGREGATION INPUTS
// ============================================================================

/// Accumulated rows joined to their site for hourly grouping. The site join
/// goes through the client id on purpose; the operational model keys sites
/// that way.
async fn hourly_inputs(pool: &PgPool) -> Result<Vec<HourlyInputRow>, sqlx::Error> {
    let rows = sqlx::query_as::<
        _,
        (
            i64,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
        ),
    >(
        r#"
        SELECT
            ha.servicio_id,
            ha.key_dim_fecha,
            ha.key_dim_cliente,
            ha.key_dim_mensajero,
            ha.key_dim_hora,
            ds.key_dim_sede
        FROM hecho_entrega_acumulado ha
        JOIN dim_cliente dc ON ha.key_dim_cliente = dc.key_dim_cliente
        JOIN dim_sede ds ON dc.cliente_id = ds.sede_id
        WHERE ha.hora_iniciado IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(servicio_id, key_dim_fecha, key_dim_cliente, key_dim_mensajero, key_dim_hora, key_dim_sede)| {
                HourlyInputRow {
                    servicio_id,
                    key_dim_fecha,
                    key_dim_cliente,
                    key_dim_mensajero,
                    key_dim_hora,
                    key_dim_sede,
                }
            },
        )
        .collect())
}

async fn daily_inputs(pool: &PgPool) -> Result<Vec<DailyInputRow>, sqlx::Error> {
    let rows = sqlx::query_as::<
        _,
        (
            i64,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i32>,
        ),
    >(
        r#"
        SELECT
            ha.servicio_id,
            ha.key_dim_fecha,
            ha.key_dim_cliente,
            ha.key_dim_mensajero,
            ds.key_dim_sede,
            df.dia_semana
        FROM hecho_entrega_acumulado ha
        JOIN dim_cliente dc ON ha.key_dim_cliente = dc.key_dim_cliente
        JOIN dim_sede ds ON dc.cliente_id = ds.sede_id
        JOIN dim_fecha df ON ha.key_dim_fecha = df.key_dim_fecha
        WHERE ha.fecha_iniciado IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(servicio_id, key_dim_fecha, key_dim_cliente, key_dim_mensajero, key_dim_sede, dia_semana)| {
                DailyInputRow {
                    servicio_id,
                    key_dim_fecha,
                    key_dim_cliente,
                    key_dim_mensajero,
                    key_dim_sede,
                    dia_semana,
                }
            },
        )
        .collect())
}

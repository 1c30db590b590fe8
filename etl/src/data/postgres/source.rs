//! Extraction queries against the operational dispatch database
//!
//! Each fetch mirrors one logical record stream the transforms consume.
//! Identifier columns are cast to BIGINT and clock columns to TEXT in SQL so
//! the decoded shapes stay stable even if the operational schema narrows
//! its integer types.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use crate::core::config::PostgresConfig;
use crate::data::error::DataError;
use crate::data::traits::SourceRepository;
use crate::data::types::{
    ClientRow, CourierRow, IncidentLogRow, IncidentRefRow, ServiceEventRow, SiteRow, StatusRow,
};

use super::PostgresService;

/// Operational database access
pub struct PostgresSource {
    service: PostgresService,
}

impl PostgresSource {
    /// Connect to the operational database
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DataError> {
        let service = PostgresService::init(config, DataError::from_source).await?;
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
impl SourceRepository for PostgresSource {
    async fn fetch_service_events(&self) -> Result<Vec<ServiceEventRow>, DataError> {
        let rows = sqlx::query_as::<_, (i64, Option<i64>, Option<i64>, i32, NaiveDate, String)>(
            r#"
            SELECT
                s.id::bigint AS servicio_id,
                s.cliente_id::bigint AS cliente_id,
                s.mensajero_id::bigint AS mensajero_inicial_id,
                es.estado_id::int AS estado_id,
                es.fecha AS fecha_estado,
                COALESCE(es.hora::text, '') AS hora_estado
            FROM mensajeria_servicio s
            JOIN mensajeria_estadosservicio es ON s.id = es.servicio_id
            ORDER BY s.id, es.fecha, es.hora
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(
                |(servicio_id, cliente_id, mensajero_inicial_id, estado_id, fecha_estado, hora_estado)| {
                    ServiceEventRow {
                        servicio_id,
                        cliente_id,
                        mensajero_inicial_id,
                        estado_id,
                        fecha_estado,
                        hora_estado,
                    }
                },
            )
            .collect())
    }

    async fn fetch_clients(&self) -> Result<Vec<ClientRow>, DataError> {
        type Row = (
            i64,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );
        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT
                c.cliente_id::bigint AS cliente_id,
                c.nombre,
                c.nit_cliente,
                tc.nombre AS tipo_cliente,
                c.sector,
                c.email,
                c.telefono,
                c.direccion,
                c.nombre_contacto,
                ci.nombre AS ciudad
            FROM cliente c
            LEFT JOIN tipo_cliente tc ON c.tipo_cliente_id = tc.tipo_cliente_id
            LEFT JOIN ciudad ci ON c.ciudad_id = ci.ciudad_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    cliente_id,
                    nombre,
                    nit_cliente,
                    tipo_cliente,
                    sector,
                    email,
                    telefono,
                    direccion,
                    nombre_contacto,
                    ciudad,
                )| ClientRow {
                    cliente_id,
                    nombre,
                    nit_cliente,
                    tipo_cliente,
                    sector,
                    email,
                    telefono,
                    direccion,
                    nombre_contacto,
                    ciudad,
                },
            )
            .collect())
    }

    async fn fetch_couriers(&self) -> Result<Vec<CourierRow>, DataError> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                Option<NaiveDate>,
                Option<NaiveDate>,
                Option<String>,
                Option<bool>,
            ),
        >(
            r#"
            SELECT
                m.id::bigint AS mensajero_id,
                m.fecha_entrada,
                m.fecha_salida,
                c.nombre AS ciudad_operacion,
                m.activo
            FROM clientes_mensajeroaquitoy m
            LEFT JOIN ciudad c ON m.ciudad_operacion_id = c.ciudad_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(
                |(mensajero_id, fecha_entrada, fecha_salida, ciudad_operacion, activo)| {
                    CourierRow {
                        mensajero_id,
                        fecha_entrada,
                        fecha_salida,
                        ciudad_operacion,
                        activo,
                    }
                },
            )
            .collect())
    }

    async fn fetch_sites(&self) -> Result<Vec<SiteRow>, DataError> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                Option<String>,
                Option<String>,
                Option<String>,
                Option<String>,
            ),
        >(
            r#"
            SELECT
                sede.sede_id::bigint AS sede_id,
                sede.nombre AS nombre_sede,
                sede.direccion AS direccion_sede,
                ciudad.nombre AS ciudad_sede,
                departamento.nombre AS departamento_sede
            FROM sede
            JOIN ciudad ON sede.ciudad_id = ciudad.ciudad_id
            JOIN departamento ON ciudad.departamento_id = departamento.departamento_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(
                |(sede_id, nombre_sede, direccion_sede, ciudad_sede, departamento_sede)| SiteRow {
                    sede_id,
                    nombre_sede,
                    direccion_sede,
                    ciudad_sede,
                    departamento_sede,
                },
            )
            .collect())
    }

    async fn fetch_incident_catalog(&self) -> Result<Vec<IncidentRefRow>, DataError> {
        let rows = sqlx::query_as::<_, (i64, Option<i64>, Option<String>)>(
            r#"
            SELECT
                id::bigint AS novedad_id,
                tipo_novedad_id::bigint AS tipo_novedad_id,
                descripcion
            FROM mensajeria_novedadesservicio
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(|(novedad_id, tipo_novedad_id, descripcion)| IncidentRefRow {
                novedad_id,
                tipo_novedad_id,
                descripcion,
            })
            .collect())
    }

    async fn fetch_status_catalog(&self) -> Result<Vec<StatusRow>, DataError> {
        let rows = sqlx::query_as::<_, (i64, Option<String>, Option<String>)>(
            r#"
            SELECT
                id::bigint AS estado_id,
                nombre AS nombre_estado,
                descripcion
            FROM mensajeria_estado
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(|(estado_id, nombre_estado, descripcion)| StatusRow {
                estado_id,
                nombre_estado,
                descripcion,
            })
            .collect())
    }

    async fn fetch_incident_log(&self) -> Result<Vec<IncidentLogRow>, DataError> {
        // The join condition ties the incident id to the service's client id.
        // That is how the operational reports have always read this table, so
        // the warehouse keeps the same row set.
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                NaiveDateTime,
                Option<i64>,
                Option<i64>,
                Option<i64>,
                Option<String>,
            ),
        >(
            r#"
            SELECT
                n.id::bigint AS novedad_id,
                n.fecha_novedad::timestamp AS fecha_hora_novedad,
                s.cliente_id::bigint AS cliente_id,
                n.mensajero_id::bigint AS mensajero_id,
                n.tipo_novedad_id::bigint AS tipo_novedad_id,
                n.descripcion
            FROM mensajeria_novedadesservicio n
            JOIN mensajeria_servicio s ON n.id = s.cliente_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(DataError::from_source)?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    novedad_id,
                    fecha_hora_novedad,
                    cliente_id,
                    mensajero_id,
                    tipo_novedad_id,
                    descripcion,
                )| IncidentLogRow {
                    novedad_id,
                    fecha_hora_novedad,
                    cliente_id,
                    mensajero_id,
                    tipo_novedad_id,
                    descripcion,
                },
            )
            .collect())
    }
}

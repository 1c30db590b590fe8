//! In-memory data backends
//!
//! Implements both repository traits over vectors behind a lock, for unit
//! tests and offline runs without live databases. Surrogate keys behave
//! like the warehouse sequences: they are assigned in insert order starting
//! at 1, keep counting across replace loads, and restart only when the
//! schema is rebuilt.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use super::error::DataError;
use super::traits::{SourceRepository, WarehouseRepository};
use super::types::{
    AccumulatedFactRow, ClientRow, CourierRow, DailyFactRow, DailyInputRow, DateDimRow,
    HourDimRow, HourlyFactRow, HourlyInputRow, IncidentFactRow, IncidentLogRow, IncidentRefRow,
    ServiceEventRow, SiteRow, StatusRow,
};

// ============================================================================
// SOURCE
// ============================================================================

/// Operational database stand-in, preloaded with its record streams
#[derive(Debug, Default)]
pub struct MemorySource {
    pub events: Vec<ServiceEventRow>,
    pub clients: Vec<ClientRow>,
    pub couriers: Vec<CourierRow>,
    pub sites: Vec<SiteRow>,
    pub incident_catalog: Vec<IncidentRefRow>,
    pub status_catalog: Vec<StatusRow>,
    pub incident_log: Vec<IncidentLogRow>,
}

#[async_trait]
impl SourceRepository for MemorySource {
    async fn fetch_service_events(&self) -> Result<Vec<ServiceEventRow>, DataError> {
        Ok(self.events.clone())
    }

    async fn fetch_clients(&self) -> Result<Vec<ClientRow>, DataError> {
        Ok(self.clients.clone())
    }

    async fn fetch_couriers(&self) -> Result<Vec<CourierRow>, DataError> {
        Ok(self.couriers.clone())
    }

    async fn fetch_sites(&self) -> Result<Vec<SiteRow>, DataError> {
        Ok(self.sites.clone())
    }

    async fn fetch_incident_catalog(&self) -> Result<Vec<IncidentRefRow>, DataError> {
        Ok(self.incident_catalog.clone())
    }

    async fn fetch_status_catalog(&self) -> Result<Vec<StatusRow>, DataError> {
        Ok(self.status_catalog.clone())
    }

    async fn fetch_incident_log(&self) -> Result<Vec<IncidentLogRow>, DataError> {
        Ok(self.incident_log.clone())
    }
}

// ============================================================================
// WAREHOUSE
// ============================================================================

/// Dimension table with a sequence counter. Replacing rows clears the table
/// but keeps the counter running, the way DELETE leaves a database sequence
/// untouched.
#[derive(Debug)]
struct DimTable<T> {
    rows: Vec<(i64, T)>,
    next_key: i64,
}

impl<T> Default for DimTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_key: 0,
        }
    }
}

impl<T: Clone> DimTable<T> {
    fn replace(&mut self, rows: &[T]) -> u64 {
        self.rows.clear();
        for row in rows {
            self.next_key += 1;
            self.rows.push((self.next_key, row.clone()));
        }
        rows.len() as u64
    }

    fn reset(&mut self) {
        self.rows.clear();
        self.next_key = 0;
    }
}

#[derive(Debug, Default)]
struct WarehouseState {
    schema_ready: bool,
    date_dim: DimTable<DateDimRow>,
    hour_dim: DimTable<HourDimRow>,
    client_dim: DimTable<ClientRow>,
    courier_dim: DimTable<CourierRow>,
    site_dim: DimTable<SiteRow>,
    incident_dim: DimTable<IncidentRefRow>,
    status_dim: DimTable<StatusRow>,
    accumulated: Vec<AccumulatedFactRow>,
    hourly: Vec<HourlyFactRow>,
    daily: Vec<DailyFactRow>,
    incidents: Vec<IncidentFactRow>,
    last_saved: Option<NaiveDate>,
}

/// Warehouse stand-in
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    state: RwLock<WarehouseState>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Snapshots for assertions ----

    pub fn accumulated_rows(&self) -> Vec<AccumulatedFactRow> {
        self.state.read().accumulated.clone()
    }

    pub fn hourly_rows(&self) -> Vec<HourlyFactRow> {
        self.state.read().hourly.clone()
    }

    pub fn daily_rows(&self) -> Vec<DailyFactRow> {
        self.state.read().daily.clone()
    }

    pub fn incident_rows(&self) -> Vec<IncidentFactRow> {
        self.state.read().incidents.clone()
    }

    pub fn last_saved(&self) -> Option<NaiveDate> {
        self.state.read().last_saved
    }
}

#[async_trait]
impl WarehouseRepository for MemoryWarehouse {
    async fn reset_schema(&self) -> Result<(), DataError> {
        let mut state = self.state.write();
        state.schema_ready = true;
        state.date_dim.reset();
        state.hour_dim.reset();
        state.client_dim.reset();
        state.courier_dim.reset();
        state.site_dim.reset();
        state.incident_dim.reset();
        state.status_dim.reset();
        state.accumulated.clear();
        state.hourly.clear();
        state.daily.clear();
        state.incidents.clear();
        Ok(())
    }

    async fn missing_tables(&self, required: &[&str]) -> Result<Vec<String>, DataError> {
        let state = self.state.read();
        if state.schema_ready {
            Ok(Vec::new())
        } else {
            Ok(required.iter().map(|t| t.to_string()).collect())
        }
    }

    async fn load_date_dim(
        &self,
        rows: &[DateDimRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.date_dim.replace(rows))
    }

    async fn load_hour_dim(
        &self,
        rows: &[HourDimRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.hour_dim.replace(rows))
    }

    async fn load_client_dim(
        &self,
        rows: &[ClientRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.client_dim.replace(rows))
    }

    async fn load_courier_dim(
        &self,
        rows: &[CourierRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.courier_dim.replace(rows))
    }

    async fn load_site_dim(&self, rows: &[SiteRow], saved: NaiveDate) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.site_dim.replace(rows))
    }

    async fn load_incident_dim(
        &self,
        rows: &[IncidentRefRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.incident_dim.replace(rows))
    }

    async fn load_status_dim(
        &self,
        rows: &[StatusRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        Ok(state.status_dim.replace(rows))
    }

    async fn load_accumulated_fact(
        &self,
        rows: &[AccumulatedFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        state.accumulated = rows.to_vec();
        Ok(rows.len() as u64)
    }

    async fn load_hourly_fact(
        &self,
        rows: &[HourlyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        state.hourly = rows.to_vec();
        Ok(rows.len() as u64)
    }

    async fn load_daily_fact(
        &self,
        rows: &[DailyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        state.daily = rows.to_vec();
        Ok(rows.len() as u64)
    }

    async fn load_incident_fact(
        &self,
        rows: &[IncidentFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError> {
        let mut state = self.state.write();
        state.last_saved = Some(saved);
        state.incidents = rows.to_vec();
        Ok(rows.len() as u64)
    }

    async fn read_date_keys(&self) -> Result<Vec<(i64, NaiveDate)>, DataError> {
        let state = self.state.read();
        Ok(state
            .date_dim
            .rows
            .iter()
            .map(|(key, row)| (*key, row.fecha))
            .collect())
    }

    async fn read_client_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        let state = self.state.read();
        Ok(state
            .client_dim
            .rows
            .iter()
            .map(|(key, row)| (*key, row.cliente_id))
            .collect())
    }

    async fn read_courier_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        let state = self.state.read();
        Ok(state
            .courier_dim
            .rows
            .iter()
            .map(|(key, row)| (*key, row.mensajero_id))
            .collect())
    }

    async fn read_hour_keys(&self) -> Result<Vec<(i64, i32)>, DataError> {
        let state = self.state.read();
        Ok(state
            .hour_dim
            .rows
            .iter()
            .map(|(key, row)| (*key, row.hora))
            .collect())
    }

    async fn read_incident_keys(&self) -> Result<Vec<(i64, i64)>, DataError> {
        let state = self.state.read();
        Ok(state
            .incident_dim
            .rows
            .iter()
            .map(|(key, row)| (*key, row.novedad_id))
            .collect())
    }

    async fn fetch_hourly_inputs(&self) -> Result<Vec<HourlyInputRow>, DataError> {
        let state = self.state.read();
        let mut out = Vec::new();
        for fact in &state.accumulated {
            if fact.hora_iniciado.is_none() {
                continue;
            }
            let Some(client_key) = fact.key_dim_cliente else {
                continue;
            };
            let Some((_, client)) = state
                .client_dim
                .rows
                .iter()
                .find(|(key, _)| *key == client_key)
            else {
                continue;
            };
            for (site_key, site) in &state.site_dim.rows {
                if site.sede_id != client.cliente_id {
                    continue;
                }
                out.push(HourlyInputRow {
                    servicio_id: fact.servicio_id,
                    key_dim_fecha: fact.key_dim_fecha,
                    key_dim_cliente: Some(client_key),
                    key_dim_mensajero: fact.key_dim_mensajero,
                    key_dim_hora: fact.key_dim_hora,
                    key_dim_sede: Some(*site_key),
                });
            }
        }
        Ok(out)
    }

    async fn fetch_daily_inputs(&self) -> Result<Vec<DailyInputRow>, DataError> {
        let state = self.state.read();
        let mut out = Vec::new();
        for fact in &state.accumulated {
            if fact.fecha_iniciado.is_none() {
                continue;
            }
            let Some(client_key) = fact.key_dim_cliente else {
                continue;
            };
            let Some((_, client)) = state
                .client_dim
                .rows
                .iter()
                .find(|(key, _)| *key == client_key)
            else {
                continue;
            };
            let Some(date_key) = fact.key_dim_fecha else {
                continue;
            };
            let Some((_, date)) = state
                .date_dim
                .rows
                .iter()
                .find(|(key, _)| *key == date_key)
            else {
                continue;
            };
            for (site_key, site) in &state.site_dim.rows {
                if site.sede_id != client.cliente_id {
                    continue;
                }
                out.push(DailyInputRow {
                    servicio_id: fact.servicio_id,
                    key_dim_fecha: Some(date_key),
                    key_dim_cliente: Some(client_key),
                    key_dim_mensajero: fact.key_dim_mensajero,
                    key_dim_sede: Some(*site_key),
                    dia_semana: Some(date.dia_semana),
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(cliente_id: i64) -> ClientRow {
        ClientRow {
            cliente_id,
            nombre: Some(format!("cliente {cliente_id}")),
            nit_cliente: None,
            tipo_cliente: None,
            sector: None,
            email: None,
            telefono: None,
            direccion: None,
            nombre_contacto: None,
            ciudad: None,
        }
    }

    fn site(sede_id: i64) -> SiteRow {
        SiteRow {
            sede_id,
            nombre_sede: Some(format!("sede {sede_id}")),
            direccion_sede: None,
            ciudad_sede: None,
            departamento_sede: None,
        }
    }

    fn accumulated(servicio_id: i64, client_key: Option<i64>) -> AccumulatedFactRow {
        AccumulatedFactRow {
            servicio_id,
            key_dim_fecha: Some(1),
            key_dim_cliente: client_key,
            key_dim_mensajero: Some(1),
            key_dim_hora: Some(9),
            fecha_iniciado: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            hora_iniciado: Some("08:30:00".into()),
            fecha_asignado: None,
            hora_asignado: None,
            fecha_novedad: None,
            hora_novedad: None,
            fecha_ultima_novedad: None,
            hora_ultima_novedad: None,
            fecha_recogido: None,
            hora_recogido: None,
            fecha_entregado: None,
            hora_entregado: None,
            fecha_cerrado: None,
            hora_cerrado: None,
            tiempo_asignacion: "00:00:00".into(),
            tiempo_total_novedades: "00:00:00".into(),
            tiempo_recogida: "00:00:00".into(),
            tiempo_entrega: "00:00:00".into(),
            tiempo_cierre: "00:00:00".into(),
            cantidad_novedades: 0,
        }
    }

    fn saved() -> NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_replace_keeps_sequence_running() {
        let warehouse = MemoryWarehouse::new();
        warehouse.reset_schema().await.unwrap();

        let rows = vec![client(10), client(11)];
        warehouse.load_client_dim(&rows, saved()).await.unwrap();
        let first: Vec<i64> = warehouse
            .read_client_keys()
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(first, vec![1, 2]);

        warehouse.load_client_dim(&rows, saved()).await.unwrap();
        let second: Vec<i64> = warehouse
            .read_client_keys()
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(second, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_schema_reset_restarts_sequences() {
        let warehouse = MemoryWarehouse::new();
        warehouse.reset_schema().await.unwrap();
        warehouse
            .load_client_dim(&[client(10)], saved())
            .await
            .unwrap();

        warehouse.reset_schema().await.unwrap();
        warehouse
            .load_client_dim(&[client(10)], saved())
            .await
            .unwrap();

        let keys = warehouse.read_client_keys().await.unwrap();
        assert_eq!(keys, vec![(1, 10)]);
    }

    #[tokio::test]
    async fn test_missing_tables_before_and_after_reset() {
        let warehouse = MemoryWarehouse::new();
        let required = ["dim_fecha", "dim_cliente"];

        let missing = warehouse.missing_tables(&required).await.unwrap();
        assert_eq!(missing, vec!["dim_fecha", "dim_cliente"]);

        warehouse.reset_schema().await.unwrap();
        let missing = warehouse.missing_tables(&required).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_hourly_inputs_join_through_client_and_site() {
        let warehouse = MemoryWarehouse::new();
        warehouse.reset_schema().await.unwrap();
        // client key 1 -> cliente_id 10, matched by site with sede_id 10
        warehouse
            .load_client_dim(&[client(10)], saved())
            .await
            .unwrap();
        warehouse
            .load_site_dim(&[site(10), site(99)], saved())
            .await
            .unwrap();

        let facts = vec![
            accumulated(1, Some(1)),
            accumulated(2, None),
            AccumulatedFactRow {
                hora_iniciado: None,
                ..accumulated(3, Some(1))
            },
        ];
        warehouse
            .load_accumulated_fact(&facts, saved())
            .await
            .unwrap();

        let inputs = warehouse.fetch_hourly_inputs().await.unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].servicio_id, 1);
        assert_eq!(inputs[0].key_dim_sede, Some(1));
    }

    #[tokio::test]
    async fn test_daily_inputs_carry_weekday_from_date_dim() {
        let warehouse = MemoryWarehouse::new();
        warehouse.reset_schema().await.unwrap();
        warehouse
            .load_date_dim(
                &[DateDimRow {
                    fecha: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    anio: 2024,
                    mes: 3,
                    dia: 1,
                    dia_semana: 4,
                }],
                saved(),
            )
            .await
            .unwrap();
        warehouse
            .load_client_dim(&[client(10)], saved())
            .await
            .unwrap();
        warehouse.load_site_dim(&[site(10)], saved()).await.unwrap();
        warehouse
            .load_accumulated_fact(&[accumulated(1, Some(1))], saved())
            .await
            .unwrap();

        let inputs = warehouse.fetch_daily_inputs().await.unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].dia_semana, Some(4));
    }
}

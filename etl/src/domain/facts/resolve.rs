//! Surrogate-key resolution for the accumulated fact
//!
//! Dimension tables assign surrogate keys on insert, so resolution works on
//! the rows read back from the warehouse. Unmatched natural keys leave the
//! surrogate key NULL; fact rows are never dropped here.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::data::types::AccumulatedFactRow;
use crate::utils::time::clock_hour;

use super::reshape::ServiceLifecycle;

/// Natural-key to surrogate-key lookups for the four dimensions the
/// accumulated fact references
#[derive(Debug, Default)]
pub struct DimensionKeys {
    dates: HashMap<NaiveDate, i64>,
    clients: HashMap<i64, i64>,
    couriers: HashMap<i64, i64>,
    hours: HashMap<i32, i64>,
}

impl DimensionKeys {
    /// Build the lookups from (surrogate key, natural key) pairs as the
    /// warehouse read-back queries return them
    pub fn new(
        dates: Vec<(i64, NaiveDate)>,
        clients: Vec<(i64, i64)>,
        couriers: Vec<(i64, i64)>,
        hours: Vec<(i64, i32)>,
    ) -> Self {
        Self {
            dates: invert(dates),
            clients: invert(clients),
            couriers: invert(couriers),
            hours: invert(hours),
        }
    }
}

pub(crate) fn invert<K: Eq + Hash>(pairs: Vec<(i64, K)>) -> HashMap<K, i64> {
    pairs
        .into_iter()
        .map(|(key, natural)| (natural, key))
        .collect()
}

/// Resolve all lifecycles into loadable fact rows, preserving order
pub fn resolve_all(lifecycles: &[ServiceLifecycle], keys: &DimensionKeys) -> Vec<AccumulatedFactRow> {
    lifecycles
        .iter()
        .map(|lifecycle| attach_keys(lifecycle, keys))
        .collect()
}

/// Resolve one lifecycle against the dimension lookups. The date and hour
/// keys derive from the "iniciado" stage only: a service with no recorded
/// start (or a start hour that does not parse) keeps NULL keys there.
pub fn attach_keys(lifecycle: &ServiceLifecycle, keys: &DimensionKeys) -> AccumulatedFactRow {
    let start = lifecycle.iniciado.as_ref();
    let first_novedad = lifecycle.novedades.as_ref().map(|n| &n.first);
    let last_novedad = lifecycle.novedades.as_ref().map(|n| &n.last);

    let key_dim_fecha = start.and_then(|s| keys.dates.get(&s.fecha).copied());
    let key_dim_cliente = lifecycle
        .cliente_id
        .and_then(|id| keys.clients.get(&id).copied());
    let key_dim_mensajero = lifecycle
        .mensajero_inicial_id
        .and_then(|id| keys.couriers.get(&id).copied());
    let key_dim_hora = start
        .and_then(|s| clock_hour(&s.hora))
        .and_then(|h| keys.hours.get(&(h as i32)).copied());

    AccumulatedFactRow {
        servicio_id: lifecycle.servicio_id,
        key_dim_fecha,
        key_dim_cliente,
        key_dim_mensajero,
        key_dim_hora,
        fecha_iniciado: start.map(|s| s.fecha),
        hora_iniciado: start.map(|s| s.hora.clone()),
        fecha_asignado: lifecycle.asignado.as_ref().map(|s| s.fecha),
        hora_asignado: lifecycle.asignado.as_ref().map(|s| s.hora.clone()),
        fecha_novedad: first_novedad.map(|s| s.fecha),
        hora_novedad: first_novedad.map(|s| s.hora.clone()),
        fecha_ultima_novedad: last_novedad.map(|s| s.fecha),
        hora_ultima_novedad: last_novedad.map(|s| s.hora.clone()),
        fecha_recogido: lifecycle.recogido.as_ref().map(|s| s.fecha),
        hora_recogido: lifecycle.recogido.as_ref().map(|s| s.hora.clone()),
        fecha_entregado: lifecycle.entregado.as_ref().map(|s| s.fecha),
        hora_entregado: lifecycle.entregado.as_ref().map(|s| s.hora.clone()),
        fecha_cerrado: lifecycle.cerrado.as_ref().map(|s| s.fecha),
        hora_cerrado: lifecycle.cerrado.as_ref().map(|s| s.hora.clone()),
        tiempo_asignacion: lifecycle.tiempos.asignacion.clone(),
        tiempo_total_novedades: lifecycle.tiempos.total_novedades.clone(),
        tiempo_recogida: lifecycle.tiempos.recogida.clone(),
        tiempo_entrega: lifecycle.tiempos.entrega.clone(),
        tiempo_cierre: lifecycle.tiempos.cierre.clone(),
        cantidad_novedades: lifecycle.cantidad_novedades(),
    }
}

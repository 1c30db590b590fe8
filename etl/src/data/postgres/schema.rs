//! PostgreSQL warehouse schema
//!
//! Dimensional schema for the delivery warehouse. Every load is a full
//! rebuild, so the schema ships as two batches: one that tears the star
//! down (facts before the dimensions they reference) and one that
//! recreates it.

/// Drop all warehouse tables. Facts go first so the dimension drops
/// never trip foreign keys.
pub const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS hecho_novedades_servicio;
DROP TABLE IF EXISTS hecho_entrega_servicio_diaria;
DROP TABLE IF EXISTS hecho_entrega_servicio_hora;
DROP TABLE IF EXISTS hecho_entrega_acumulado;
DROP TABLE IF EXISTS dim_estado;
DROP TABLE IF EXISTS dim_novedad;
DROP TABLE IF EXISTS dim_sede;
DROP TABLE IF EXISTS dim_mensajero;
DROP TABLE IF EXISTS dim_cliente;
DROP TABLE IF EXISTS dim_hora;
DROP TABLE IF EXISTS dim_fecha;
"#;

/// Full warehouse schema as a single SQL batch.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Dimensions
-- ============================================================================

CREATE TABLE IF NOT EXISTS dim_fecha (
    key_dim_fecha BIGSERIAL PRIMARY KEY,
    fecha DATE NOT NULL,
    año INTEGER NOT NULL,
    mes INTEGER NOT NULL,
    dia INTEGER NOT NULL,
    dia_semana INTEGER NOT NULL,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_hora (
    key_dim_hora BIGSERIAL PRIMARY KEY,
    hora INTEGER NOT NULL,
    periodo_dia TEXT NOT NULL,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_cliente (
    key_dim_cliente BIGSERIAL PRIMARY KEY,
    cliente_id BIGINT NOT NULL,
    nombre TEXT,
    nit_cliente TEXT,
    tipo_cliente TEXT,
    sector TEXT,
    email TEXT,
    telefono TEXT,
    direccion TEXT,
    nombre_contacto TEXT,
    ciudad TEXT,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_mensajero (
    key_dim_mensajero BIGSERIAL PRIMARY KEY,
    mensajero_id BIGINT NOT NULL,
    fecha_entrada DATE,
    fecha_salida DATE,
    ciudad_operacion TEXT,
    activo BOOLEAN,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_sede (
    key_dim_sede BIGSERIAL PRIMARY KEY,
    sede_id BIGINT NOT NULL,
    nombre_sede TEXT,
    direccion_sede TEXT,
    ciudad_sede TEXT,
    departamento_sede TEXT,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_novedad (
    key_dim_novedad BIGSERIAL PRIMARY KEY,
    novedad_id BIGINT NOT NULL,
    tipo_novedad_id BIGINT,
    descripcion TEXT,
    saved DATE
);

CREATE TABLE IF NOT EXISTS dim_estado (
    key_dim_estado BIGSERIAL PRIMARY KEY,
    estado_id BIGINT NOT NULL,
    nombre_estado TEXT,
    descripcion TEXT,
    saved DATE
);

-- ============================================================================
-- Facts
-- ============================================================================

-- One row per service, stage stamps denormalized alongside the
-- elapsed-time columns so analysts never re-derive them.
CREATE TABLE IF NOT EXISTS hecho_entrega_acumulado (
    servicio_id BIGINT NOT NULL,
    key_dim_fecha BIGINT REFERENCES dim_fecha (key_dim_fecha),
    key_dim_cliente BIGINT REFERENCES dim_cliente (key_dim_cliente),
    key_dim_mensajero BIGINT REFERENCES dim_mensajero (key_dim_mensajero),
    key_dim_hora BIGINT REFERENCES dim_hora (key_dim_hora),
    fecha_iniciado DATE,
    hora_iniciado TEXT,
    fecha_asignado DATE,
    hora_asignado TEXT,
    fecha_novedad DATE,
    hora_novedad TEXT,
    fecha_ultima_novedad DATE,
    hora_ultima_novedad TEXT,
    fecha_recogido DATE,
    hora_recogido TEXT,
    fecha_entregado DATE,
    hora_entregado TEXT,
    fecha_cerrado DATE,
    hora_cerrado TEXT,
    tiempo_asignacion TEXT NOT NULL,
    tiempo_total_novedades TEXT NOT NULL,
    tiempo_recogida TEXT NOT NULL,
    tiempo_entrega TEXT NOT NULL,
    tiempo_cierre TEXT NOT NULL,
    cantidad_novedades BIGINT NOT NULL,
    saved DATE
);

CREATE TABLE IF NOT EXISTS hecho_entrega_servicio_hora (
    servicio_id BIGINT NOT NULL,
    key_dim_fecha BIGINT NOT NULL REFERENCES dim_fecha (key_dim_fecha),
    key_dim_cliente BIGINT NOT NULL REFERENCES dim_cliente (key_dim_cliente),
    key_dim_mensajero BIGINT NOT NULL REFERENCES dim_mensajero (key_dim_mensajero),
    key_dim_hora BIGINT NOT NULL REFERENCES dim_hora (key_dim_hora),
    key_dim_sede BIGINT NOT NULL REFERENCES dim_sede (key_dim_sede),
    cantidad_servicios BIGINT NOT NULL,
    saved DATE
);

CREATE TABLE IF NOT EXISTS hecho_entrega_servicio_diaria (
    servicio_id BIGINT NOT NULL,
    key_dim_fecha BIGINT NOT NULL REFERENCES dim_fecha (key_dim_fecha),
    key_dim_cliente BIGINT NOT NULL REFERENCES dim_cliente (key_dim_cliente),
    key_dim_mensajero BIGINT NOT NULL REFERENCES dim_mensajero (key_dim_mensajero),
    key_dim_sede BIGINT NOT NULL REFERENCES dim_sede (key_dim_sede),
    dia_semana INTEGER NOT NULL,
    cantidad_servicios_dia BIGINT NOT NULL,
    saved DATE
);

CREATE TABLE IF NOT EXISTS hecho_novedades_servicio (
    key_dim_fecha BIGINT REFERENCES dim_fecha (key_dim_fecha),
    key_dim_cliente BIGINT REFERENCES dim_cliente (key_dim_cliente),
    key_dim_novedad BIGINT REFERENCES dim_novedad (key_dim_novedad),
    fecha_hora_novedad DATE,
    descripcion TEXT,
    saved DATE
);
"#;

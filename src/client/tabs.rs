// src/client/tabs.rs
//
// Well-known tab names on the portal spreadsheet. Table names are opaque to
// the cache and client; these constants just keep call sites honest.

/// Fund-level configuration and KPI row (single-row table).
pub const CONFIG_MAESTRA: &str = "CONFIG_MAESTRA";

/// Shareholder roster: uid, name, email, share count per row.
pub const LIBRO_ACCIONISTAS: &str = "LIBRO_ACCIONISTAS";

/// Monthly fund vs. benchmark yields, one row per period, in table order.
pub const RENTABILIDAD_HISTORICA: &str = "RENTABILIDAD_HISTORICA";

/// Execution log: one row per trade, open rows have no close fields yet.
pub const EJECUCIONES: &str = "EJECUCIONES";

/// Payout history per shareholder and period.
pub const REPARTOS: &str = "REPARTOS";

/// Payout bank accounts registered by shareholders.
pub const CUENTAS_REPARTO: &str = "CUENTAS_REPARTO";

/// Corporate notices shown on the dashboard.
pub const NOTICIAS: &str = "NOTICIAS";

//! Source adapters.
//!
//! Each adapter implements [`Adapter`](crate::adapter::Adapter) for one
//! [`Source`](crate::adapter::Source).
//!
//! # Available Adapters
//!
//! | Adapter | Source | Feature |
//! |---------|--------|---------|
//! | [`CsvExportAdapter`] | Delimited export (timestamp, flag, text) | `export-csv` |
//! | [`DeviceDbAdapter`] | JSON rows extracted from the device database | `device-db` |
//! | [`SyntheticAdapter`] | Rows from a [`MessageGenerator`] | `synthetic` |
//!
//! The [`clean`] module holds the helpers every adapter shares and is always
//! available.

pub mod clean;

#[cfg(feature = "export-csv")]
mod csv_export;
#[cfg(feature = "device-db")]
mod device_db;
#[cfg(feature = "synthetic")]
mod synthetic;

#[cfg(feature = "export-csv")]
pub use csv_export::CsvExportAdapter;
#[cfg(feature = "device-db")]
pub use device_db::{DeviceAttachment, DeviceDbAdapter, DeviceRow, Flag};
#[cfg(feature = "synthetic")]
pub use synthetic::{
    MessageGenerator, SAMPLE_EMOJIS, SampleGenerator, SyntheticAdapter, SyntheticRow,
};

//! Serial driver for the PrometheusAstro motorized flat panel cover.
//!
//! The panel speaks a plain-text protocol over USB serial: the driver
//! sends bare command tokens and mirrors the cover position and LED
//! brightness from the status lines the controller emits.

pub mod serial;
pub mod device;

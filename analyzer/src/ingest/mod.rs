pub mod csv;
pub mod nmea;

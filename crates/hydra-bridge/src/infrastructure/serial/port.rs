//! Opening the dongle's serial port.
//!
//! A port named in the configuration is used as-is.  Otherwise the USB
//! serial ports are scanned for the dongle's product string.

use tokio_serial::{SerialPortBuilderExt, SerialPortType, SerialStream};
use tracing::{debug, info};

use super::LinkError;
use crate::infrastructure::storage::config::SerialSettings;

/// Opens the configured port, or the first port whose USB product string
/// matches `settings.product_name`.
pub fn open_port(settings: &SerialSettings) -> Result<SerialStream, LinkError> {
    let path = match &settings.device {
        Some(path) => path.clone(),
        None => find_dongle_port(&settings.product_name)?,
    };
    let stream = tokio_serial::new(&path, settings.baud_rate).open_native_async()?;
    info!(port = %path, baud = settings.baud_rate, "serial port opened");
    Ok(stream)
}

/// Finds the serial port whose USB product string is `product`.
pub fn find_dongle_port(product: &str) -> Result<String, LinkError> {
    let ports: Vec<(String, Option<String>)> = tokio_serial::available_ports()?
        .into_iter()
        .map(|info| {
            let usb_product = match info.port_type {
                SerialPortType::UsbPort(usb) => usb.product,
                _ => None,
            };
            (info.port_name, usb_product)
        })
        .collect();
    debug!(count = ports.len(), "serial ports enumerated");

    pick_port(&ports, product).ok_or_else(|| LinkError::PortNotFound(product.to_string()))
}

/// First port name whose product string equals `product`.
fn pick_port(ports: &[(String, Option<String>)], product: &str) -> Option<String> {
    ports
        .iter()
        .find(|(_, usb_product)| usb_product.as_deref() == Some(product))
        .map(|(name, _)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> Vec<(String, Option<String>)> {
        vec![
            ("/dev/ttyS0".to_string(), None),
            ("/dev/ttyUSB0".to_string(), Some("FT232R USB UART".to_string())),
            ("/dev/ttyACM0".to_string(), Some("Board CDC".to_string())),
        ]
    }

    #[test]
    fn test_pick_port_matches_product_string() {
        assert_eq!(
            pick_port(&ports(), "Board CDC").as_deref(),
            Some("/dev/ttyACM0")
        );
    }

    #[test]
    fn test_pick_port_requires_an_exact_product_match() {
        assert_eq!(pick_port(&ports(), "Board"), None);
        assert_eq!(pick_port(&[], "Board CDC"), None);
    }
}

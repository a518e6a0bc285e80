//! One-shot device discovery via UDP broadcast.

use std::time::Duration;

use log::info;

use crate::client::Client;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Discover LIFX devices on the local network.
///
/// Broadcasts a service query, then processes announcements and the
/// version, firmware, color and label responses they trigger until
/// `discovery_timeout` has elapsed. The returned client keeps its socket,
/// so the devices it found can be queried and commanded right away.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use lifx_lan_rs::{Hsbk, discover_devices};
///
/// let mut client = discover_devices(Duration::from_secs(2)).await?;
/// println!("Found {} devices", client.controller().count());
/// for device in client.controller().devices() {
///     println!("  {} - {} ({})", device.mac(), device.label(), device.product_name());
/// }
///
/// if let Some(first) = client.controller().device_by_index(0) {
///     client.set_light_power(first, true, 250).await?;
/// }
/// ```
pub async fn discover_devices(discovery_timeout: Duration) -> Result<Client> {
    let mut client = Client::bind().await?;
    client.discover().await?;
    client.listen(discovery_timeout).await?;

    info!(
        "discovery finished with {} devices",
        client.controller().count()
    );
    Ok(client)
}

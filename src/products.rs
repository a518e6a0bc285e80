//! Static product catalog.
//!
//! Data is taken from <https://github.com/LIFX/products/blob/master/products.json>
//! (vendor 1). Relay devices such as the LIFX Switch are not lights.

use serde::Serialize;

/// Name used for product ids missing from the catalog.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Capabilities of a product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductInfo {
    pub id: u32,
    pub name: &'static str,
    pub color: bool,
    pub infrared: bool,
    pub multizone: bool,
    pub chain: bool,
    pub matrix: bool,
    pub hev: bool,
    pub relays: bool,
    /// Supported color temperature range in Kelvin, when published.
    pub temperature_range: Option<(u16, u16)>,
}

impl ProductInfo {
    const fn light(id: u32, name: &'static str, color: bool, range: (u16, u16)) -> Self {
        ProductInfo {
            id,
            name,
            color,
            infrared: false,
            multizone: false,
            chain: false,
            matrix: false,
            hev: false,
            relays: false,
            temperature_range: Some(range),
        }
    }

    const fn with_infrared(mut self) -> Self {
        self.infrared = true;
        self
    }

    const fn with_multizone(mut self) -> Self {
        self.multizone = true;
        self
    }

    const fn with_matrix(mut self) -> Self {
        self.matrix = true;
        self
    }

    const fn with_chain(mut self) -> Self {
        self.chain = true;
        self
    }

    const fn with_hev(mut self) -> Self {
        self.hev = true;
        self
    }

    const fn switch(id: u32) -> Self {
        ProductInfo {
            id,
            name: "LIFX Switch",
            color: false,
            infrared: false,
            multizone: false,
            chain: false,
            matrix: false,
            hev: false,
            relays: true,
            temperature_range: None,
        }
    }

    /// Whether devices of this product accept light messages.
    pub fn is_light(&self) -> bool {
        !self.relays
    }
}

const COLOR: (u16, u16) = (2500, 9000);
const COLOR_WIDE: (u16, u16) = (1500, 9000);
const WHITE: (u16, u16) = (2700, 2700);
const TUNABLE: (u16, u16) = (2700, 6500);

#[rustfmt::skip]
static PRODUCTS: &[ProductInfo] = &[
    ProductInfo::light(1, "LIFX Original 1000", true, COLOR),
    ProductInfo::light(3, "LIFX Color 650", true, COLOR),
    ProductInfo::light(10, "LIFX White 800 (Low Voltage)", false, TUNABLE),
    ProductInfo::light(11, "LIFX White 800 (High Voltage)", false, TUNABLE),
    ProductInfo::light(15, "LIFX Color 1000", true, COLOR),
    ProductInfo::light(18, "LIFX White 900 BR30 (Low Voltage)", false, (2500, 9000)),
    ProductInfo::light(19, "LIFX White 900 BR30 (High Voltage)", false, (2500, 9000)),
    ProductInfo::light(20, "LIFX Color 1000 BR30", true, COLOR),
    ProductInfo::light(22, "LIFX Color 1000", true, COLOR),
    ProductInfo::light(27, "LIFX A19", true, COLOR),
    ProductInfo::light(28, "LIFX BR30", true, COLOR),
    ProductInfo::light(29, "LIFX A19 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(30, "LIFX BR30 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(31, "LIFX Z", true, COLOR).with_multizone(),
    ProductInfo::light(32, "LIFX Z", true, COLOR).with_multizone(),
    ProductInfo::light(36, "LIFX Downlight", true, COLOR),
    ProductInfo::light(37, "LIFX Downlight", true, COLOR),
    ProductInfo::light(38, "LIFX Beam", true, COLOR).with_multizone(),
    ProductInfo::light(39, "LIFX Downlight White to Warm", false, (1500, 9000)),
    ProductInfo::light(40, "LIFX Downlight", true, COLOR),
    ProductInfo::light(43, "LIFX A19", true, COLOR),
    ProductInfo::light(44, "LIFX BR30", true, COLOR),
    ProductInfo::light(45, "LIFX A19 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(46, "LIFX BR30 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(49, "LIFX Mini Color", true, COLOR),
    ProductInfo::light(50, "LIFX Mini White to Warm", false, (1500, 4000)),
    ProductInfo::light(51, "LIFX Mini White", false, WHITE),
    ProductInfo::light(52, "LIFX GU10", true, COLOR),
    ProductInfo::light(53, "LIFX GU10", true, COLOR),
    ProductInfo::light(55, "LIFX Tile", true, COLOR).with_matrix().with_chain(),
    ProductInfo::light(57, "LIFX Candle", true, COLOR_WIDE).with_matrix(),
    ProductInfo::light(59, "LIFX Mini Color", true, COLOR),
    ProductInfo::light(60, "LIFX Mini White to Warm", false, (1500, 4000)),
    ProductInfo::light(61, "LIFX Mini White", false, WHITE),
    ProductInfo::light(62, "LIFX A19", true, COLOR),
    ProductInfo::light(63, "LIFX BR30", true, COLOR),
    ProductInfo::light(64, "LIFX A19 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(65, "LIFX BR30 Night Vision", true, COLOR).with_infrared(),
    ProductInfo::light(66, "LIFX Mini White", false, WHITE),
    ProductInfo::light(68, "LIFX Candle", true, COLOR_WIDE).with_matrix(),
    ProductInfo::switch(70),
    ProductInfo::switch(71),
    ProductInfo::light(81, "LIFX Candle White to Warm", false, (2200, 6500)),
    ProductInfo::light(82, "LIFX Filament Clear", false, (2100, 2100)),
    ProductInfo::light(85, "LIFX Filament Amber", false, (2000, 2000)),
    ProductInfo::light(87, "LIFX Mini White", false, WHITE),
    ProductInfo::light(88, "LIFX Mini White", false, WHITE),
    ProductInfo::switch(89),
    ProductInfo::light(90, "LIFX Clean", true, COLOR).with_hev(),
    ProductInfo::light(91, "LIFX Color", true, COLOR),
    ProductInfo::light(92, "LIFX Color", true, COLOR),
    ProductInfo::light(94, "LIFX BR30", true, COLOR),
    ProductInfo::light(96, "LIFX Candle White to Warm", false, (2200, 6500)),
    ProductInfo::light(97, "LIFX A19", true, COLOR),
    ProductInfo::light(98, "LIFX BR30", true, COLOR),
    ProductInfo::light(99, "LIFX Clean", true, COLOR).with_hev(),
    ProductInfo::light(100, "LIFX Filament Clear", false, (2100, 2100)),
    ProductInfo::light(101, "LIFX Filament Amber", false, (2000, 2000)),
    ProductInfo::switch(115),
    ProductInfo::switch(116),
];

/// Look up the catalog entry for a product id.
pub fn product_info(product_id: u32) -> Option<&'static ProductInfo> {
    PRODUCTS.iter().find(|p| p.id == product_id)
}

/// Human-readable product name, or [`UNKNOWN_PRODUCT`].
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::products;
///
/// assert_eq!(products::name_for(27), "LIFX A19");
/// assert_eq!(products::name_for(0), products::UNKNOWN_PRODUCT);
/// ```
pub fn name_for(product_id: u32) -> &'static str {
    product_info(product_id).map_or(UNKNOWN_PRODUCT, |p| p.name)
}

/// Whether a product id is a light. Unknown ids are not.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::products;
///
/// assert!(products::is_light(27));
/// assert!(!products::is_light(70)); // LIFX Switch
/// assert!(!products::is_light(0));
/// ```
pub fn is_light(product_id: u32) -> bool {
    product_info(product_id).is_some_and(ProductInfo::is_light)
}

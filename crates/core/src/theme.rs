//! Store themes and their presentation config.
//!
//! Each store tenant names a theme in its store resource. Rather than one set
//! of pages per theme, the storefront renders a single parameterized page per
//! concern (product card, cart, profile, order confirmation) and feeds it the
//! theme's [`ThemeConfig`].
//!
//! Dispatch is a static lookup from tag to theme. A missing or unknown tag
//! resolves to [`ThemeSelection::Fallback`], which renders with the default
//! theme.

use serde::{Deserialize, Serialize};

use crate::cart::QuantityPolicy;

/// A visual theme bundle, keyed by the tag stored on the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreTheme {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "furniture-interior")]
    FurnitureInterior,
    #[serde(rename = "perfume-fragrances")]
    PerfumeFragrances,
    #[serde(rename = "baby-kids")]
    BabyKids,
    #[serde(rename = "electronics-gadgets")]
    ElectronicsGadgets,
    #[serde(rename = "fashion-apparel")]
    FashionApparel,
    #[serde(rename = "watches-accessories")]
    WatchesAccessories,
    #[serde(rename = "beauty-cosmetics")]
    BeautyCosmetics,
}

/// Tag -> theme lookup table.
const THEME_TABLE: &[(&str, StoreTheme)] = &[
    ("default", StoreTheme::Default),
    ("furniture-interior", StoreTheme::FurnitureInterior),
    ("perfume-fragrances", StoreTheme::PerfumeFragrances),
    ("baby-kids", StoreTheme::BabyKids),
    ("electronics-gadgets", StoreTheme::ElectronicsGadgets),
    ("fashion-apparel", StoreTheme::FashionApparel),
    ("watches-accessories", StoreTheme::WatchesAccessories),
    ("beauty-cosmetics", StoreTheme::BeautyCosmetics),
];

impl StoreTheme {
    /// Every theme, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        THEME_TABLE.iter().map(|(_, theme)| *theme)
    }

    /// Look up a theme by its tag. Matching ignores case and surrounding
    /// whitespace.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        THEME_TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(tag))
            .map(|(_, theme)| *theme)
    }

    /// The tag this theme is stored under.
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.config().tag
    }

    /// Presentation config for this theme.
    #[must_use]
    pub const fn config(self) -> &'static ThemeConfig {
        match self {
            Self::Default => &DEFAULT,
            Self::FurnitureInterior => &FURNITURE_INTERIOR,
            Self::PerfumeFragrances => &PERFUME_FRAGRANCES,
            Self::BabyKids => &BABY_KIDS,
            Self::ElectronicsGadgets => &ELECTRONICS_GADGETS,
            Self::FashionApparel => &FASHION_APPAREL,
            Self::WatchesAccessories => &WATCHES_ACCESSORIES,
            Self::BeautyCosmetics => &BEAUTY_COSMETICS,
        }
    }
}

/// Aspect ratio of product images on cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    Square,
    Portrait,
    Landscape,
}

impl CardLayout {
    /// CSS class applied to the card image frame.
    #[must_use]
    pub const fn aspect_class(self) -> &'static str {
        match self {
            Self::Square => "aspect-square",
            Self::Portrait => "aspect-[3/4]",
            Self::Landscape => "aspect-[4/3]",
        }
    }
}

/// Everything a themed page needs to know about its theme.
#[derive(Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    pub tag: &'static str,
    pub display_name: &'static str,
    /// Class on `<body>`, selecting the theme's stylesheet rules.
    pub body_class: &'static str,
    /// Classes for primary buttons and badges.
    pub accent_class: &'static str,
    pub heading_font: &'static str,
    pub card_layout: CardLayout,
    pub show_category_badge: bool,
    pub cart_heading: &'static str,
    pub empty_cart_message: &'static str,
    pub confirmation_heading: &'static str,
    pub profile_heading: &'static str,
    /// What the cart does when a quantity below one is submitted.
    pub quantity_policy: QuantityPolicy,
}

const DEFAULT: ThemeConfig = ThemeConfig {
    tag: "default",
    display_name: "Classic",
    body_class: "theme-default",
    accent_class: "bg-gray-900 text-white hover:bg-gray-700",
    heading_font: "font-sans",
    card_layout: CardLayout::Square,
    show_category_badge: true,
    cart_heading: "Shopping Cart",
    empty_cart_message: "Your cart is empty.",
    confirmation_heading: "Thank you for your order",
    profile_heading: "My Account",
    quantity_policy: QuantityPolicy::Clamp,
};

const FURNITURE_INTERIOR: ThemeConfig = ThemeConfig {
    tag: "furniture-interior",
    display_name: "Furniture & Interior",
    body_class: "theme-furniture",
    accent_class: "bg-amber-800 text-amber-50 hover:bg-amber-900",
    heading_font: "font-serif",
    card_layout: CardLayout::Landscape,
    show_category_badge: true,
    cart_heading: "Your Selection",
    empty_cart_message: "No pieces selected yet.",
    confirmation_heading: "Your pieces are on their way",
    profile_heading: "Your Home Profile",
    quantity_policy: QuantityPolicy::Clamp,
};

const PERFUME_FRAGRANCES: ThemeConfig = ThemeConfig {
    tag: "perfume-fragrances",
    display_name: "Perfume & Fragrances",
    body_class: "theme-perfume",
    accent_class: "bg-rose-900 text-rose-50 hover:bg-rose-950",
    heading_font: "font-serif",
    card_layout: CardLayout::Portrait,
    show_category_badge: false,
    cart_heading: "Your Fragrance Bag",
    empty_cart_message: "Your bag is waiting for a scent.",
    confirmation_heading: "Your fragrances are being prepared",
    profile_heading: "Your Scent Profile",
    quantity_policy: QuantityPolicy::Clamp,
};

const BABY_KIDS: ThemeConfig = ThemeConfig {
    tag: "baby-kids",
    display_name: "Baby & Kids",
    body_class: "theme-baby-kids",
    accent_class: "bg-sky-500 text-white hover:bg-sky-600",
    heading_font: "font-sans",
    card_layout: CardLayout::Square,
    show_category_badge: true,
    cart_heading: "Your Basket",
    empty_cart_message: "Your basket is empty.",
    confirmation_heading: "Hooray! Your order is confirmed",
    profile_heading: "Family Account",
    quantity_policy: QuantityPolicy::Remove,
};

const ELECTRONICS_GADGETS: ThemeConfig = ThemeConfig {
    tag: "electronics-gadgets",
    display_name: "Electronics & Gadgets",
    body_class: "theme-electronics",
    accent_class: "bg-blue-700 text-white hover:bg-blue-800",
    heading_font: "font-mono",
    card_layout: CardLayout::Square,
    show_category_badge: true,
    cart_heading: "Cart",
    empty_cart_message: "No devices in your cart.",
    confirmation_heading: "Order confirmed",
    profile_heading: "Account",
    quantity_policy: QuantityPolicy::Clamp,
};

const FASHION_APPAREL: ThemeConfig = ThemeConfig {
    tag: "fashion-apparel",
    display_name: "Fashion & Apparel",
    body_class: "theme-fashion",
    accent_class: "bg-black text-white hover:bg-neutral-800",
    heading_font: "font-serif",
    card_layout: CardLayout::Portrait,
    show_category_badge: false,
    cart_heading: "Shopping Bag",
    empty_cart_message: "Your bag is empty.",
    confirmation_heading: "Thanks for shopping with us",
    profile_heading: "My Wardrobe",
    quantity_policy: QuantityPolicy::Clamp,
};

const WATCHES_ACCESSORIES: ThemeConfig = ThemeConfig {
    tag: "watches-accessories",
    display_name: "Watches & Accessories",
    body_class: "theme-watches",
    accent_class: "bg-stone-800 text-amber-200 hover:bg-stone-900",
    heading_font: "font-serif",
    card_layout: CardLayout::Square,
    show_category_badge: true,
    cart_heading: "Your Collection",
    empty_cart_message: "Your collection is empty.",
    confirmation_heading: "Your timepieces are reserved",
    profile_heading: "Collector Profile",
    quantity_policy: QuantityPolicy::Clamp,
};

const BEAUTY_COSMETICS: ThemeConfig = ThemeConfig {
    tag: "beauty-cosmetics",
    display_name: "Beauty & Cosmetics",
    body_class: "theme-beauty",
    accent_class: "bg-pink-600 text-white hover:bg-pink-700",
    heading_font: "font-sans",
    card_layout: CardLayout::Portrait,
    show_category_badge: true,
    cart_heading: "Beauty Bag",
    empty_cart_message: "Your beauty bag is empty.",
    confirmation_heading: "Your glow is on its way",
    profile_heading: "Beauty Profile",
    quantity_policy: QuantityPolicy::Clamp,
};

/// Result of dispatching a tenant's theme tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSelection {
    /// The tag named a known theme.
    Themed(StoreTheme),
    /// The tag was missing or unknown; the default theme renders instead.
    Fallback { requested: Option<String> },
}

impl ThemeSelection {
    /// Resolve a tenant's theme tag.
    #[must_use]
    pub fn dispatch(tag: Option<&str>) -> Self {
        match tag.and_then(StoreTheme::from_tag) {
            Some(theme) => Self::Themed(theme),
            None => Self::Fallback {
                requested: tag.map(str::to_string),
            },
        }
    }

    /// The theme that will actually render.
    #[must_use]
    pub const fn theme(&self) -> StoreTheme {
        match self {
            Self::Themed(theme) => *theme,
            Self::Fallback { .. } => StoreTheme::Default,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &'static ThemeConfig {
        self.theme().config()
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

//! Visual and audio escalation for accepted tips.

use serde::Serialize;

use super::event::TipNotification;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub premium: bool,
}

const fn item(id: &'static str, name: &'static str, price: f64, premium: bool) -> GiftItem {
    GiftItem {
        id,
        name,
        price,
        premium,
    }
}

/// Gift skins available to tippers, cheapest first.
pub const GIFT_CATALOG: &[GiftItem] = &[
    item("support", "Support", 1.0, false),
    item("siptip", "SipTip", 2.0, false),
    item("botsupport", "BotSupport", 5.0, false),
    item("friendlyai", "FriendlyAI", 7.0, false),
    item("audiomoney", "AudioMoney", 10.0, false),
    item("modbot", "ModBot", 15.0, false),
    item("vibes", "Vibes", 20.0, false),
    item("buzz", "Buzz", 50.0, true),
    item("eos", "EOS mini", 75.0, true),
    item("alphas", "Alphas", 100.0, true),
    item("lootbox", "LootBox", 150.0, true),
    item("makeover", "Makeover", 150.0, true),
    item("nfchips", "NFChips", 200.0, true),
    item("kash", "Kash", 500.0, true),
    item("bloom", "Bloom", 750.0, true),
    item("habiti", "Habiti", 1000.0, true),
    item("loveraid", "LoveRaid", 2000.0, true),
    item("flexbag", "FlexBag", 2500.0, true),
    item("whalepack", "WhalePack", 5000.0, true),
    item("starpower", "StarPower", 10000.0, true),
];

/// Look a gift up by id, falling back to a case-insensitive name match.
pub fn find_gift(gift_type: &str, gift_name: Option<&str>) -> Option<&'static GiftItem> {
    GIFT_CATALOG
        .iter()
        .find(|g| g.id.eq_ignore_ascii_case(gift_type))
        .or_else(|| {
            let name = gift_name?;
            GIFT_CATALOG.iter().find(|g| g.name.eq_ignore_ascii_case(name))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftTier {
    Standard,
    Premium,
    Mega,
}

impl GiftTier {
    pub fn classify(price: f64, premium: bool) -> Self {
        if price >= 1000.0 {
            GiftTier::Mega
        } else if premium || price >= 50.0 {
            GiftTier::Premium
        } else {
            GiftTier::Standard
        }
    }
}

/// Synthesized chime played when a gift overlay enters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneProfile {
    pub frequency_hz: f64,
    pub duration_ms: u64,
    /// Also play a tone at 1.5x the base frequency.
    pub harmonic: bool,
}

impl ToneProfile {
    pub fn for_price(price: f64) -> Self {
        if price >= 1000.0 {
            Self {
                frequency_hz: 800.0,
                duration_ms: 800,
                harmonic: true,
            }
        } else if price >= 100.0 {
            Self {
                frequency_hz: 600.0,
                duration_ms: 600,
                harmonic: true,
            }
        } else {
            Self {
                frequency_hz: 400.0,
                duration_ms: 400,
                harmonic: false,
            }
        }
    }

    pub fn harmonic_hz(&self) -> Option<f64> {
        self.harmonic.then_some(self.frequency_hz * 1.5)
    }
}

/// Where a notification is rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Surface {
    /// Chat line only, no overlay.
    Inline,
    #[serde(rename_all = "camelCase")]
    TipOverlay { mega: bool },
    #[serde(rename_all = "camelCase")]
    GiftOverlay {
        gift_id: Option<String>,
        tier: GiftTier,
        tone: ToneProfile,
    },
}

impl Surface {
    pub fn for_notification(notification: &TipNotification) -> Self {
        if notification.is_large_tier() {
            return Surface::TipOverlay {
                mega: notification.is_mega_tip,
            };
        }
        if notification.is_gift_tier() {
            let event = &notification.event;
            let gift = event
                .gift_type
                .as_deref()
                .and_then(|t| find_gift(t, event.gift_name.as_deref()));
            let (price, premium) = match gift {
                Some(g) => (g.price, g.premium),
                None => (event.amount, false),
            };
            return Surface::GiftOverlay {
                gift_id: gift.map(|g| g.id.to_string()),
                tier: GiftTier::classify(price, premium),
                tone: ToneProfile::for_price(price),
            };
        }
        Surface::Inline
    }
}

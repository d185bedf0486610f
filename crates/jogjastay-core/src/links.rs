//! External-maps deep links built from a record's coordinates.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::geo::LatLng;

// Conservative set for URL query components: escape whitespace, parens, and
// the usual delimiters alongside controls.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b'?');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapsPlatform {
    Ios,
    Android,
    Web,
}

/// Platform-specific deep link to an external maps application, with the
/// generic web fall-back for everything else.
#[must_use]
pub fn maps_link(platform: MapsPlatform, position: LatLng, name: &str) -> String {
    let LatLng { lat, lng } = position;
    match platform {
        MapsPlatform::Ios => format!("maps://?daddr={lat},{lng}"),
        MapsPlatform::Android => {
            let label = utf8_percent_encode(name, QUERY);
            format!("geo:{lat},{lng}?q={lat},{lng}({label})")
        }
        MapsPlatform::Web => {
            format!("https://www.google.com/maps/search/?api=1&query={lat},{lng}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: LatLng = LatLng {
        lat: -7.7822,
        lng: 110.4027,
    };

    #[test]
    fn ios_link_uses_daddr_scheme() {
        assert_eq!(
            maps_link(MapsPlatform::Ios, POS, "Royal Ambarrukmo"),
            "maps://?daddr=-7.7822,110.4027"
        );
    }

    #[test]
    fn android_link_percent_encodes_the_label() {
        let link = maps_link(MapsPlatform::Android, POS, "POP! Hotel (Malioboro)");
        assert!(link.starts_with("geo:-7.7822,110.4027?q="));
        assert!(link.contains("POP!%20Hotel%20%28Malioboro%29"));
    }

    #[test]
    fn web_link_is_plain_google_maps_search() {
        let link = maps_link(MapsPlatform::Web, POS, "ignored");
        assert_eq!(
            link,
            "https://www.google.com/maps/search/?api=1&query=-7.7822,110.4027"
        );
    }
}

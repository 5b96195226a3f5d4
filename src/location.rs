// Location parsing.
//
// The fault export carries the physical location as a single free-text
// hierarchy, e.g. `Campus East > Block 4 > L3 > Server Room`. The parser
// splits it into at most four ordered fields and never fails: a blank or
// missing cell simply yields four absent fields.
use crate::types::Location;

/// Literal separator between hierarchy segments.
pub const SEGMENT_SEPARATOR: &str = " > ";

/// Split a raw location path into (site, building, level, room).
///
/// Segments are assigned left to right; anything beyond the fourth segment
/// is dropped. Positions with no corresponding segment stay `None`.
pub fn parse_location(raw: Option<&str>) -> Location {
    let mut location = Location::default();
    let Some(raw) = raw else {
        return location;
    };
    if raw.trim().is_empty() {
        return location;
    }
    let mut segments = raw.split(SEGMENT_SEPARATOR);
    location.site = segments.next().map(str::to_string);
    location.building = segments.next().map(str::to_string);
    location.level = segments.next().map(str::to_string);
    location.room = segments.next().map(str::to_string);
    location
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn three_segments_leave_room_absent() {
        let loc = parse_location(Some("SiteA > Bldg1 > L2"));
        assert_eq!(loc.site.as_deref(), Some("SiteA"));
        assert_eq!(loc.building.as_deref(), Some("Bldg1"));
        assert_eq!(loc.level.as_deref(), Some("L2"));
        assert_eq!(loc.room, None);
    }

    #[test]
    fn fifth_segment_is_dropped() {
        let loc = parse_location(Some("A > B > C > D > E"));
        assert_eq!(loc.site.as_deref(), Some("A"));
        assert_eq!(loc.building.as_deref(), Some("B"));
        assert_eq!(loc.level.as_deref(), Some("C"));
        assert_eq!(loc.room.as_deref(), Some("D"));
    }

    #[test]
    fn single_segment_is_the_site() {
        let loc = parse_location(Some("Main Campus"));
        assert_eq!(loc.site.as_deref(), Some("Main Campus"));
        assert_eq!(loc.building, None);
        assert_eq!(loc.level, None);
        assert_eq!(loc.room, None);
    }

    #[test]
    fn absent_or_blank_input_yields_all_absent() {
        assert_eq!(parse_location(None), Location::default());
        assert_eq!(parse_location(Some("   ")), Location::default());
    }

    #[test]
    fn composite_key_joins_absent_segments_as_empty() {
        let loc = parse_location(Some("SiteA > Bldg1 > L2"));
        assert_eq!(loc.composite_key(), "Bldg1_L2_");
        let loc = parse_location(Some("SiteA"));
        assert_eq!(loc.composite_key(), "__");
    }
}

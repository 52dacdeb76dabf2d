// Scanner for the game client's chat log lines.
// Two report formats are recognized; everything else is ignored without logging.

use crate::domain::{
    BuildingDamage, BuildingKind, Coords, EventExtractor, GameEvent, PlayerSighting,
};

const SIGHTING_PHRASE: &str = "Разведчики засекли игрока ";
const SIGHTING_LOCATION: &str = "координатах";
const DAMAGE_PHRASE: &str = "Здание";
const DAMAGE_LOCATION: &str = "на координатах";
const DAMAGE_WORLD_PREFIX: &str = "world,";
const DAMAGE_SUFFIX: &str = " повреждено!";

/// Extracts player sightings first, then building damage reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoutReportExtractor;

impl EventExtractor for ScoutReportExtractor {
    fn extract(&self, line: &str) -> Option<GameEvent> {
        parse_sighting(line)
            .map(GameEvent::PlayerPosition)
            .or_else(|| parse_damage(line).map(GameEvent::BuildingDamage))
    }
}

/// `Разведчики засекли игрока <name>[(suffix)] … координатах [world,]<x>,<y>,<z>`
pub fn parse_sighting(line: &str) -> Option<PlayerSighting> {
    line.match_indices(SIGHTING_PHRASE)
        .find_map(|(at, phrase)| sighting_after(&line[at + phrase.len()..]))
}

fn sighting_after(rest: &str) -> Option<PlayerSighting> {
    let name_len = rest
        .find(|c: char| c == '(' || c == '[' || c.is_whitespace())
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let (name, tail) = rest.split_at(name_len);

    // Any "(...)" suffix after the name is skipped by searching for the locating word.
    tail.match_indices(SIGHTING_LOCATION).find_map(|(at, word)| {
        let numbers = skip_required_whitespace(&tail[at + word.len()..])?;
        let ((x, y, z), _) = parse_triple(skip_dimension_label(numbers), parse_decimal)?;
        Some(PlayerSighting {
            name: name.to_string(),
            x,
            y: Some(y),
            z,
        })
    })
}

/// `Здание [decoration] <type> (<percent>%) на координатах world,<x>,<y>,<z> повреждено!`
pub fn parse_damage(line: &str) -> Option<BuildingDamage> {
    line.match_indices(DAMAGE_PHRASE)
        .find_map(|(at, phrase)| damage_after(&line[at + phrase.len()..]))
}

fn damage_after(rest: &str) -> Option<BuildingDamage> {
    let mut candidates: Vec<(usize, BuildingKind)> = BuildingKind::KNOWN
        .into_iter()
        .filter_map(|kind| {
            let at = rest.find(kind.display_name())?;
            is_decoration(&rest[..at]).then_some((at, kind))
        })
        .collect();
    candidates.sort_by_key(|(at, _)| *at);

    candidates.into_iter().find_map(|(at, kind)| {
        let (percent, coords) = damage_fields(&rest[at + kind.display_name().len()..])?;
        Some(BuildingDamage {
            kind,
            percent,
            coords,
        })
    })
}

fn damage_fields(s: &str) -> Option<(u8, Coords)> {
    let s = s.trim_start().strip_prefix('(')?;
    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digits == 0 {
        return None;
    }
    let percent = s[..digits]
        .parse::<u8>()
        .ok()
        .filter(|percent| *percent <= 100)?;

    let s = s[digits..].strip_prefix("%)")?;
    let s = skip_required_whitespace(s)?.strip_prefix(DAMAGE_LOCATION)?;
    let s = skip_required_whitespace(s)?.strip_prefix(DAMAGE_WORLD_PREFIX)?;
    let ((x, y, z), s) = parse_triple(s, parse_integer)?;

    s.starts_with(DAMAGE_SUFFIX)
        .then(|| (percent, Coords::new(x, y, z)))
}

// Icons or punctuation between "Здание" and the type name: one run of non-word,
// non-space characters, optionally padded by whitespace.
fn is_decoration(gap: &str) -> bool {
    gap.trim()
        .chars()
        .all(|c| !c.is_whitespace() && !c.is_ascii_alphanumeric() && c != '_')
}

fn skip_required_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

// Player reports may carry a dimension label such as "world," before the numbers.
fn skip_dimension_label(s: &str) -> &str {
    let label_len = s
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
        .unwrap_or(s.len());
    if label_len > 0 {
        if let Some(rest) = s[label_len..].strip_prefix(',') {
            return rest;
        }
    }
    s
}

fn parse_triple<T>(
    s: &str,
    parse: fn(&str) -> Option<(T, &str)>,
) -> Option<((T, T, T), &str)> {
    let (a, s) = parse(s)?;
    let (b, s) = parse(s.strip_prefix(',')?)?;
    let (c, s) = parse(s.strip_prefix(',')?)?;
    Some(((a, b, c), s))
}

// `-?\d+(\.\d*)?`
fn parse_decimal(s: &str) -> Option<(f64, &str)> {
    let end = numeric_prefix_len(s, true)?;
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

// `-?\d+`
fn parse_integer(s: &str) -> Option<(i64, &str)> {
    let end = numeric_prefix_len(s, false)?;
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

fn numeric_prefix_len(s: &str, allow_fraction: bool) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let digits_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if allow_fraction && bytes.get(i) == Some(&b'.') {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
    }
    Some(i)
}

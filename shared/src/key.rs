//! MIDI key names
//!
//! Keys are written as note names with the octave numbered so that key 60
//! is `C4`. Parsing also accepts plain key numbers and flats.

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Format a key (0..=127) as a note name, e.g. 60 -> "C4"
pub fn key_name(key: u8) -> String {
    let octave = key as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[key as usize % 12], octave)
}

/// Parse a key number or note name, returning `None` outside 0..=127
pub fn parse_key(text: &str) -> Option<u8> {
    let text = text.trim();
    if let Ok(number) = text.parse::<i32>() {
        return u8::try_from(number).ok().filter(|&k| k <= 127);
    }

    let mut chars = text.chars();
    let semitone = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let accidentals = rest
        .find(|c: char| c != '#' && c != 'b')
        .unwrap_or(rest.len());
    let (modifiers, octave) = rest.split_at(accidentals);
    let shift: i32 = modifiers.chars().map(|c| if c == '#' { 1 } else { -1 }).sum();
    let octave: i32 = octave.parse().ok()?;

    let key = octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(semitone + shift)?;
    u8::try_from(key).ok().filter(|&k| k <= 127)
}

//! XML form of a wave bank
//!
//! ```xml
//! <wave-bank name="se.ws">
//!   <wave-group archive="se.aw">
//!     <wave id="3" file="se_00003.adpcm4.raw" format="adpcm4" rate="32000" loop-start="16" loop-end="160"/>
//!   </wave-group>
//! </wave-bank>
//! ```
//!
//! Defective groups and waves are reported and skipped; the rest of the bank
//! is still read.

use crate::bank::{WaveBank, WaveGroup};
use crate::error::WsysError;
use roxmltree::{Document, Node};
use sms_audio_shared::Diagnostics;
use sms_audio_shared::xml::{Attributes, ElementExt, XmlWriter};
use sms_wave::{DEFAULT_ROOT_KEY, Wave, WaveFormat};

const WAVE_BANK: &str = "wave-bank";
const WAVE_GROUP: &str = "wave-group";
const WAVE: &str = "wave";

const NAME: &str = "name";
const ARCHIVE: &str = "archive";
const ID: &str = "id";
const FILE: &str = "file";
const FORMAT: &str = "format";
const RATE: &str = "rate";
const KEY: &str = "key";
const LOOP_START: &str = "loop-start";
const LOOP_END: &str = "loop-end";

/// Parse an XML wave bank
///
/// `name` is used when the root element carries no `name` attribute.
pub fn read_xml(text: &str, name: &str, diag: &mut Diagnostics) -> Result<WaveBank, WsysError> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if root.tag_name().name() != WAVE_BANK {
        return Err(WsysError::BadRoot(root.tag_name().name().to_string()));
    }

    let mut bank = WaveBank::new(root.attribute(NAME).unwrap_or(name));

    for element in root.elements().filter(|e| e.tag_name().name() == WAVE_GROUP) {
        let Some(archive) = element.attribute(ARCHIVE) else {
            diag.warn(format!("XML: line #{}: missing archive attribute", element.line()));
            continue;
        };

        let mut group = WaveGroup::new(archive);
        group.waves = element
            .elements()
            .filter(|e| e.tag_name().name() == WAVE)
            .filter_map(|e| read_wave(e, diag))
            .collect();
        bank.groups.push(group);
    }

    tracing::info!("XML: {} group(s), {} wave(s)", bank.groups.len(), bank.wave_count());
    Ok(bank)
}

fn read_wave(element: Node<'_, '_>, diag: &mut Diagnostics) -> Option<Wave> {
    let id: u16 = element.required(ID).map_err(|err| diag.warn(err)).ok()?;
    let file: String = element.required(FILE).map_err(|err| diag.warn(err)).ok()?;
    let format: WaveFormat = element.required(FORMAT).map_err(|err| diag.warn(err)).ok()?;

    let mut wave = Wave::new(id, format);
    wave.file_name = file;

    match element.optional::<f32>(RATE) {
        Ok(Some(rate)) if rate < 0.0 => {
            diag.warn(element.invalid(RATE, &rate.to_string()));
            return None;
        }
        Ok(rate) => wave.sample_rate = rate.unwrap_or(0.0),
        Err(err) => {
            diag.warn(err);
            return None;
        }
    }

    wave.root_key = element
        .key(KEY)
        .map_err(|err| diag.warn(err))
        .ok()?
        .unwrap_or(DEFAULT_ROOT_KEY);

    let loop_start = element.optional::<u32>(LOOP_START);
    let loop_end = element.optional::<u32>(LOOP_END);
    match (loop_start, loop_end) {
        (Ok(Some(start)), Ok(Some(end))) => {
            wave.looping = true;
            wave.loop_start = start;
            wave.loop_end = end;
        }
        (Ok(None), Ok(None)) => {}
        (Err(err), _) | (_, Err(err)) => {
            diag.warn(err);
            return None;
        }
        _ => {
            diag.warn(format!("XML: line #{}: only one loop point specified", element.line()));
            return None;
        }
    }

    Some(wave)
}

/// Serialize a bank as XML
pub fn write_xml(bank: &WaveBank) -> Result<String, WsysError> {
    let mut xml = XmlWriter::new()?;

    let mut attributes = Attributes::new();
    if !bank.name.is_empty() {
        attributes = attributes.with(NAME, &bank.name);
    }
    xml.open(WAVE_BANK, attributes)?;

    for group in &bank.groups {
        let attributes = Attributes::new().with(ARCHIVE, &group.archive);
        if group.waves.is_empty() {
            xml.empty(WAVE_GROUP, attributes)?;
            continue;
        }

        xml.open(WAVE_GROUP, attributes)?;
        for wave in &group.waves {
            let mut attributes = Attributes::new()
                .with(ID, wave.id)
                .with(FILE, &wave.file_name)
                .with(FORMAT, wave.format)
                .with(RATE, wave.sample_rate);
            if wave.root_key != DEFAULT_ROOT_KEY {
                attributes = attributes.with_key(KEY, wave.root_key);
            }
            if wave.looping {
                attributes = attributes
                    .with(LOOP_START, wave.loop_start)
                    .with(LOOP_END, wave.loop_end);
            }
            xml.empty(WAVE, attributes)?;
        }
        xml.close()?;
    }

    Ok(xml.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> WaveBank {
        let mut looped = Wave::new(3, WaveFormat::Adpcm4);
        looped.file_name = "se_00003.adpcm4.raw".to_string();
        looped.sample_rate = 32000.0;
        looped.looping = true;
        looped.loop_start = 16;
        looped.loop_end = 160;

        let mut high = Wave::new(7, WaveFormat::Pcm16);
        high.file_name = "bell.wav".to_string();
        high.root_key = 72;
        high.sample_rate = 22050.0;

        let mut group = WaveGroup::new("se.aw");
        group.waves = vec![looped, high];

        WaveBank {
            name: "se.ws".to_string(),
            groups: vec![group, WaveGroup::new("empty.aw")],
        }
    }

    #[test]
    fn test_round_trip() {
        let bank = bank();
        let text = write_xml(&bank).unwrap();
        let mut diag = Diagnostics::new();
        assert_eq!(read_xml(&text, "other", &mut diag).unwrap(), bank);
        assert_eq!(diag.warnings(), 0);
    }

    #[test]
    fn test_written_attributes() {
        let text = write_xml(&bank()).unwrap();
        assert!(text.contains("<wave-bank name=\"se.ws\">"));
        assert!(text.contains(
            "<wave id=\"3\" file=\"se_00003.adpcm4.raw\" format=\"adpcm4\" rate=\"32000\" loop-start=\"16\" loop-end=\"160\"/>"
        ));
        assert!(text.contains("format=\"pcm16\" rate=\"22050\" key=\"C5\"/>"));
        assert!(text.contains("<wave-group archive=\"empty.aw\"/>"));
    }

    #[test]
    fn test_defaults() {
        let text = r#"<wave-bank>
          <wave-group archive="a.aw">
            <wave id="1" file="a.wav" format="PCM8"/>
          </wave-group>
        </wave-bank>"#;

        let bank = read_xml(text, "fallback.ws", &mut Diagnostics::new()).unwrap();
        assert_eq!(bank.name, "fallback.ws");
        let wave = &bank.groups[0].waves[0];
        assert_eq!(wave.format, WaveFormat::Pcm8);
        assert_eq!(wave.root_key, 60);
        assert_eq!(wave.sample_rate, 0.0);
        assert!(!wave.looping);
    }

    #[test]
    fn test_defects_skip_entities() {
        let text = r#"<wave-bank name="bad">
          <wave-group>
            <wave id="1" file="a.wav" format="pcm8"/>
          </wave-group>
          <wave-group archive="b.aw">
            <wave file="a.wav" format="pcm8"/>
            <wave id="-1" file="a.wav" format="pcm8"/>
            <wave id="2" format="pcm8"/>
            <wave id="3" file="a.wav" format="pcm24"/>
            <wave id="4" file="a.wav" format="pcm8" rate="-5"/>
            <wave id="5" file="a.wav" format="pcm8" key="H9"/>
            <wave id="6" file="a.wav" format="pcm8" loop-start="0"/>
            <wave id="7" file="a.wav" format="pcm8" key="A4" loop-start="0" loop-end="10"/>
          </wave-group>
        </wave-bank>"#;

        let mut diag = Diagnostics::new();
        let bank = read_xml(text, "bad", &mut diag).unwrap();
        assert_eq!(diag.warnings(), 8);
        assert_eq!(bank.groups.len(), 1);
        let waves = &bank.groups[0].waves;
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].id, 7);
        assert_eq!(waves[0].root_key, 69);
        assert_eq!((waves[0].loop_start, waves[0].loop_end), (0, 10));
    }

    #[test]
    fn test_bad_root() {
        let result = read_xml("<IBNK virtual-number=\"0\"/>", "x", &mut Diagnostics::new());
        assert!(matches!(result, Err(WsysError::BadRoot(root)) if root == "IBNK"));
    }
}

use super::*;
use crate::bank::*;
use crate::binary::write_ibnk;
use crate::error::IbnkError;
use crate::fixtures;
use sms_audio_shared::xml::AttributeError;
use sms_audio_shared::{Diagnostics, Endian};

fn read(text: &str) -> Result<InstrumentBank, IbnkError> {
    read_xml(text, "test.bnk", &mut Diagnostics::new())
}

#[test]
fn test_round_trip() {
    let bank = fixtures::bank();
    let text = write_xml(&bank).unwrap();
    let parsed = read(&text).unwrap();
    assert_eq!(parsed, bank);
}

#[test]
fn test_defaults_are_elided() {
    let text = write_xml(&fixtures::bank()).unwrap();

    assert!(text.contains("<IBNK virtual-number=\"7\">"));
    assert!(text.contains("<instrument program=\"0\" volume=\"0.8\">"));
    assert!(text.contains("<oscillator target=\"volume\" rate=\"1.5\">"));
    assert!(text.contains("<linear time=\"10\" offset=\"32767\"/>"));
    assert!(text.contains("<hold/>"));
    assert!(text.contains("<random-effect target=\"pitch\" distance=\"0.05\"/>"));
    assert!(text.contains(
        "<sense-effect target=\"volume\" trigger=\"velocity\" center-key=\"C4\" range-lo=\"0.5\"/>"
    ));
    // The only key region sits at key 127
    assert!(text.contains("<key-region>"));
    assert!(text.contains("<velocity-region velocity=\"64\" wave-id=\"1\" volume=\"0.9\"/>"));
    // Only region at velocity 127
    assert!(text.contains("<percussion key=\"C2\">"));
    assert!(text.contains("<velocity-region wave-id=\"5\"/>"));
    assert!(!text.contains("pan="));
}

#[test]
fn test_defaults_when_reading() {
    let text = r#"
        <IBNK virtual-number="2">
          <drum-set program="1">
            <percussion key="36">
              <velocity-region wave-id="4"/>
            </percussion>
          </drum-set>
          <instrument program="0">
            <key-region>
              <velocity-region wave-id="3"/>
            </key-region>
            <sense-effect target="pitch"/>
          </instrument>
        </IBNK>"#;

    let bank = read(text).unwrap();
    assert_eq!(bank.virtual_number, 2);

    let Some(Instrument::DrumSet(drums)) = bank.get(1) else {
        panic!("expected a drum set");
    };
    let kick = drums.get(36).unwrap();
    assert_eq!(kick.pan, 0.5);
    assert_eq!(kick.release, 0);
    assert_eq!(kick.velocity_regions, vec![VelocityRegion::new(127, 4)]);

    let Some(Instrument::Melodic(melodic)) = bank.get(0) else {
        panic!("expected a melodic instrument");
    };
    assert_eq!(melodic.volume, 1.0);
    assert_eq!(melodic.key_regions[0].key, 127);
    assert_eq!(
        melodic.effects,
        vec![Effect::Sense(SenseEffect {
            target: EffectTarget::Pitch,
            trigger: SenseTrigger::Key,
            center_key: 127,
            range_lo: 0.0,
            range_hi: 1.0,
        })]
    );
}

#[test]
fn test_note_name_keys() {
    let text = r#"
        <IBNK virtual-number="0">
          <instrument program="0">
            <key-region key="Db4"><velocity-region wave-id="1"/></key-region>
            <key-region key="C4"><velocity-region wave-id="0"/></key-region>
            <key-region key="C4"><velocity-region velocity="100" wave-id="2"/></key-region>
          </instrument>
        </IBNK>"#;

    let bank = read(text).unwrap();
    let Some(Instrument::Melodic(melodic)) = bank.get(0) else {
        panic!("expected a melodic instrument");
    };
    // Sorted by key, with the two C4 regions merged
    let keys: Vec<u8> = melodic.key_regions.iter().map(|region| region.key).collect();
    assert_eq!(keys, vec![60, 61]);
    assert_eq!(melodic.key_regions[0].velocity_regions.len(), 2);
}

#[test]
fn test_xml_accepts_what_binary_rejects() {
    let mut melodic = fixtures::melodic();
    melodic.oscillators = vec![fixtures::envelope(); 3];
    let mut bank = InstrumentBank::new(1, "test.bnk");
    bank.insert(0, Instrument::Melodic(melodic));

    let text = write_xml(&bank).unwrap();
    assert_eq!(read(&text).unwrap(), bank);

    let result = write_ibnk(&bank, Endian::Big, &mut Diagnostics::new());
    assert!(matches!(result, Err(IbnkError::Incompatible(1))));
}

#[test]
fn test_missing_virtual_number_is_fatal() {
    let result = read("<IBNK/>");
    assert!(matches!(
        result,
        Err(IbnkError::Attribute(AttributeError::Missing {
            name: "virtual-number",
            ..
        }))
    ));
}

#[test]
fn test_bad_root_is_fatal() {
    let result = read(r#"<wave-bank name="x"/>"#);
    assert!(matches!(result, Err(IbnkError::BadRoot(root)) if root == "wave-bank"));
}

#[test]
fn test_unknown_table_mode_is_fatal() {
    let text = r#"<IBNK virtual-number="0">
  <instrument program="0">
    <oscillator target="volume">
      <start-table>
        <ramp time="1"/>
      </start-table>
    </oscillator>
  </instrument>
</IBNK>"#;

    let result = read(text);
    assert!(matches!(
        result,
        Err(IbnkError::UnknownTableMode { line: 5, name }) if name == "ramp"
    ));
}

#[test]
fn test_missing_oscillator_target_is_fatal() {
    let text = r#"<IBNK virtual-number="0">
      <instrument program="0"><oscillator rate="2"/></instrument>
    </IBNK>"#;
    assert!(matches!(read(text), Err(IbnkError::Attribute(_))));
}

#[test]
fn test_warnings_fail_the_read() {
    let text = r#"
        <IBNK virtual-number="0">
          <instrument program="3"/>
          <instrument program="3"/>
          <instrument/>
          <drum-set program="4">
            <percussion><velocity-region wave-id="1"/></percussion>
            <percussion key="40"><velocity-region velocity="200" wave-id="1"/></percussion>
          </drum-set>
        </IBNK>"#;

    let mut diag = Diagnostics::new();
    let result = read_xml(text, "test.bnk", &mut diag);
    assert!(matches!(result, Err(IbnkError::BadXml(4))));
    assert_eq!(diag.warnings(), 4);
}

#[test]
fn test_loop_entries() {
    let text = r#"
        <IBNK virtual-number="0">
          <instrument program="0">
            <oscillator target="pitch" width="0.5" base="1">
              <start-table>
                <sample-cell time="4" offset="-100"/>
                <loop dest="0"/>
              </start-table>
            </oscillator>
          </instrument>
        </IBNK>"#;

    let bank = read(text).unwrap();
    let Some(Instrument::Melodic(melodic)) = bank.get(0) else {
        panic!("expected a melodic instrument");
    };
    let oscillator = &melodic.oscillators[0];
    assert_eq!(oscillator.target, EffectTarget::Pitch);
    assert_eq!(oscillator.width, 0.5);
    assert_eq!(oscillator.base, 1.0);
    assert_eq!(
        oscillator.start_table,
        vec![
            TableEntry::new(TableMode::SampleCell, 4, -100),
            TableEntry::new(TableMode::Loop, 0, 0),
        ]
    );
    assert!(oscillator.release_table.is_empty());

    let written = write_xml(&bank).unwrap();
    assert!(written.contains("<loop dest=\"0\"/>"));
    assert!(!written.contains("<release-table"));
}

//! WSYS errand: convert a wave bank, packing or extracting its archives
//!
//! Going from XML to binary packs the loose wave files into archives; going
//! from binary to XML extracts them again. The wave directory is resolved
//! against the XML file and the bank directory against the binary file.

use crate::{BankFormat, Endpoint, Pipeline};
use anyhow::{Result, bail};
use sms_audio_shared::Diagnostics;
use sms_wave::MixerMode;
use sms_wsys::{DEFAULT_BANK_DIR, DEFAULT_WAVE_DIR, WaveBank};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct WsysOptions {
    pub input: Endpoint<BankFormat>,
    pub output: Endpoint<BankFormat>,
    pub mix_mode: MixerMode,
    pub wave_dir: PathBuf,
    pub bank_dir: PathBuf,
    /// Extract `.wav` files instead of raw dumps
    pub extract_wav: bool,
}

impl WsysOptions {
    pub fn new(input: Endpoint<BankFormat>, output: Endpoint<BankFormat>) -> Self {
        Self {
            input,
            output,
            mix_mode: MixerMode::default(),
            wave_dir: PathBuf::from(DEFAULT_WAVE_DIR),
            bank_dir: PathBuf::from(DEFAULT_BANK_DIR),
            extract_wav: false,
        }
    }
}

/// Build the pipeline for one wave bank conversion
pub fn pipeline(options: &WsysOptions) -> Result<Pipeline<'_, WaveBank>> {
    let input = &options.input;
    let output = &options.output;

    let pipeline = match (input.format, input.format.endian()) {
        (_, Some(endian)) => Pipeline::new("WSYS: read binary", move |diag| {
            let data = input.read()?;
            Ok(sms_wsys::read_wsys(&data, endian, &input.name(), diag)?)
        }),
        (BankFormat::Xml, None) => Pipeline::new("WSYS: read xml", move |diag| {
            let text = input.read_to_string()?;
            Ok(sms_wsys::read_xml(&text, &input.name(), diag)?)
        }),
        (_, None) => bail!("WSYS: sf2 is an output format only"),
    };

    let from_binary = input.format.endian().is_some();
    let pipeline = match (output.format, output.format.endian()) {
        (_, Some(endian)) => {
            let pipeline = if from_binary {
                pipeline
            } else {
                let wave_dir = input.sibling(&options.wave_dir);
                let bank_dir = output.sibling(&options.bank_dir);
                pipeline.then("WSYS: pack archives", move |bank, diag| {
                    Ok(sms_wsys::pack_archives(bank, &wave_dir, &bank_dir, options.mix_mode, diag)?)
                })
            };
            pipeline.then("WSYS: write binary", move |bank, diag| {
                output.write(sms_wsys::write_wsys(bank, endian, diag)?)
            })
        }
        (BankFormat::SoundFont, None) => {
            if !from_binary {
                bail!("WSYS: sf2 output needs a binary input");
            }
            let bank_dir = input.sibling(&options.bank_dir);
            pipeline.then("WSYS: write sf2", move |bank, _| {
                output.write(sms_wsys::write_soundfont(bank, &bank_dir)?)
            })
        }
        (_, None) => {
            let pipeline = if from_binary {
                let bank_dir = input.sibling(&options.bank_dir);
                let wave_dir = output.sibling(&options.wave_dir);
                pipeline.then("WSYS: extract archives", move |bank, diag| {
                    Ok(sms_wsys::extract_archives(bank, &bank_dir, &wave_dir, options.extract_wav, diag)?)
                })
            } else {
                pipeline
            };
            pipeline.then("WSYS: write xml", move |bank, _| {
                output.write(sms_wsys::write_xml(bank)?)
            })
        }
    };

    Ok(pipeline)
}

/// Run one wave bank conversion
pub fn run(options: &WsysOptions, diag: &mut Diagnostics) -> Result<()> {
    tracing::info!(
        "WSYS: {:?} ({}) -> {:?} ({})",
        options.input.path,
        options.input.format,
        options.output.path,
        options.output.format
    );
    let bank = pipeline(options)?.run(diag)?;
    tracing::info!(
        "WSYS: converted {} group(s), {} wave(s)",
        bank.groups.len(),
        bank.wave_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(input: (&Path, BankFormat), output: (&Path, BankFormat)) -> WsysOptions {
        WsysOptions::new(Endpoint::new(input.0, input.1), Endpoint::new(output.0, output.1))
    }

    #[test]
    fn test_stage_names() {
        let xml = Path::new("bank.xml");
        let bin = Path::new("bank.ws");

        let pack = options((xml, BankFormat::Xml), (bin, BankFormat::BigEndian));
        assert_eq!(
            pipeline(&pack).unwrap().names(),
            vec!["WSYS: read xml", "WSYS: pack archives", "WSYS: write binary"]
        );

        let extract = options((bin, BankFormat::LittleEndian), (xml, BankFormat::Xml));
        assert_eq!(
            pipeline(&extract).unwrap().names(),
            vec!["WSYS: read binary", "WSYS: extract archives", "WSYS: write xml"]
        );

        let rewrite = options((bin, BankFormat::BigEndian), (bin, BankFormat::LittleEndian));
        assert_eq!(
            pipeline(&rewrite).unwrap().names(),
            vec!["WSYS: read binary", "WSYS: write binary"]
        );
    }

    #[test]
    fn test_soundfont_needs_binary_input() {
        let sf2 = options(
            (Path::new("bank.xml"), BankFormat::Xml),
            (Path::new("bank.sf2"), BankFormat::SoundFont),
        );
        let err = pipeline(&sf2).err().unwrap();
        assert!(err.to_string().contains("binary input"));
    }

    #[test]
    fn test_pack_then_extract() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(project.join("waves")).unwrap();
        fs::write(project.join("waves/tone.raw"), [1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        fs::write(
            project.join("bank.xml"),
            r#"<wave-bank name="bank">
  <wave-group archive="se.aw">
    <wave id="4" file="tone.raw" format="pcm8" rate="8000" key="C5"/>
  </wave-group>
</wave-bank>
"#,
        )
        .unwrap();

        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let mut diag = Diagnostics::new();
        run(
            &options(
                (&project.join("bank.xml"), BankFormat::Xml),
                (&out.join("bank.ws"), BankFormat::BigEndian),
            ),
            &mut diag,
        )
        .unwrap();
        assert_eq!(fs::read(out.join("banks/se.aw")).unwrap().len(), 32);

        run(
            &options(
                (&out.join("bank.ws"), BankFormat::BigEndian),
                (&out.join("bank.xml"), BankFormat::Xml),
            ),
            &mut diag,
        )
        .unwrap();
        assert_eq!(diag.warnings(), 0);

        assert_eq!(
            fs::read(out.join("waves/se_00004.pcm8.raw")).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
        let text = fs::read_to_string(out.join("bank.xml")).unwrap();
        assert!(text.contains("file=\"se_00004.pcm8.raw\" format=\"pcm8\" rate=\"8000\" key=\"C5\""));
    }

    #[test]
    fn test_missing_wave_fails_packing() {
        let dir = TempDir::new().unwrap();
        let xml = dir.path().join("bank.xml");
        fs::write(
            &xml,
            r#"<wave-bank><wave-group archive="se.aw"><wave id="1" file="gone.wav" format="pcm16"/></wave-group></wave-bank>"#,
        )
        .unwrap();

        let mut diag = Diagnostics::new();
        let result = run(
            &options((&xml, BankFormat::Xml), (&dir.path().join("bank.ws"), BankFormat::BigEndian)),
            &mut diag,
        );
        assert!(result.is_err());
        assert_eq!(diag.warnings(), 1);
        assert!(!dir.path().join("bank.ws").exists());
    }
}

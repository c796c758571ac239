//! IBNK errand: convert an instrument bank between binary, XML and SoundFont

use crate::{BankFormat, Endpoint, Pipeline};
use anyhow::{Result, bail};
use sms_audio_shared::Diagnostics;
use sms_ibnk::InstrumentBank;

#[derive(Debug, Clone)]
pub struct IbnkOptions {
    pub input: Endpoint<BankFormat>,
    pub output: Endpoint<BankFormat>,
}

/// Build the pipeline for one instrument bank conversion
pub fn pipeline(options: &IbnkOptions) -> Result<Pipeline<'_, InstrumentBank>> {
    let input = &options.input;
    let output = &options.output;

    let pipeline = match (input.format, input.format.endian()) {
        (_, Some(endian)) => Pipeline::new("IBNK: read binary", move |diag| {
            let data = input.read()?;
            Ok(sms_ibnk::read_ibnk(&data, endian, &input.name(), diag)?)
        }),
        (BankFormat::Xml, None) => Pipeline::new("IBNK: read xml", move |diag| {
            let text = input.read_to_string()?;
            Ok(sms_ibnk::read_xml(&text, &input.name(), diag)?)
        }),
        (_, None) => bail!("IBNK: sf2 is an output format only"),
    };

    let pipeline = match (output.format, output.format.endian()) {
        (_, Some(endian)) => pipeline.then("IBNK: write binary", move |bank, diag| {
            output.write(sms_ibnk::write_ibnk(bank, endian, diag)?)
        }),
        (BankFormat::SoundFont, None) => pipeline.then("IBNK: write sf2", move |bank, _| {
            output.write(sms_ibnk::write_soundfont(bank)?)
        }),
        (_, None) => pipeline.then("IBNK: write xml", move |bank, _| {
            output.write(sms_ibnk::write_xml(bank)?)
        }),
    };

    Ok(pipeline)
}

/// Run one instrument bank conversion
pub fn run(options: &IbnkOptions, diag: &mut Diagnostics) -> Result<()> {
    tracing::info!(
        "IBNK: {:?} ({}) -> {:?} ({})",
        options.input.path,
        options.input.format,
        options.output.path,
        options.output.format
    );
    let bank = pipeline(options)?.run(diag)?;
    tracing::info!("IBNK: converted {} instrument(s)", bank.len());
    Ok(())
}

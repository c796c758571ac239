//! XML form of an instrument bank
//!
//! ```xml
//! <IBNK virtual-number="7">
//!   <instrument program="0" volume="0.8">
//!     <oscillator target="volume" rate="1.5">
//!       <start-table>
//!         <linear time="10" offset="32767"/>
//!         <hold/>
//!       </start-table>
//!     </oscillator>
//!     <random-effect target="pitch" distance="0.05"/>
//!     <key-region key="C4">
//!       <velocity-region velocity="64" wave-id="1"/>
//!     </key-region>
//!   </instrument>
//!   <drum-set program="5">
//!     <percussion key="C2">
//!       <velocity-region wave-id="5"/>
//!     </percussion>
//!   </drum-set>
//! </IBNK>
//! ```
//!
//! Attributes that hold their default value are left out when writing.

mod read;
mod write;

#[cfg(test)]
mod tests;

pub use read::read_xml;
pub use write::write_xml;

/// Element and attribute names
mod names {
    pub const IBNK: &str = "IBNK";
    pub const INSTRUMENT: &str = "instrument";
    pub const DRUM_SET: &str = "drum-set";
    pub const PERCUSSION: &str = "percussion";
    pub const OSCILLATOR: &str = "oscillator";
    pub const START_TABLE: &str = "start-table";
    pub const RELEASE_TABLE: &str = "release-table";
    pub const RANDOM_EFFECT: &str = "random-effect";
    pub const SENSE_EFFECT: &str = "sense-effect";
    pub const KEY_REGION: &str = "key-region";
    pub const VELOCITY_REGION: &str = "velocity-region";

    pub const VIRTUAL_NUMBER: &str = "virtual-number";
    pub const PROGRAM: &str = "program";
    pub const KEY: &str = "key";
    pub const VELOCITY: &str = "velocity";
    pub const WAVE_ID: &str = "wave-id";
    pub const VOLUME: &str = "volume";
    pub const PITCH: &str = "pitch";
    pub const PAN: &str = "pan";
    pub const RELEASE: &str = "release";
    pub const TARGET: &str = "target";
    pub const TRIGGER: &str = "trigger";
    pub const RATE: &str = "rate";
    pub const WIDTH: &str = "width";
    pub const BASE: &str = "base";
    pub const DISTANCE: &str = "distance";
    pub const CENTER_KEY: &str = "center-key";
    pub const RANGE_LO: &str = "range-lo";
    pub const RANGE_HI: &str = "range-hi";
    pub const TIME: &str = "time";
    pub const OFFSET: &str = "offset";
    pub const DEST: &str = "dest";
}

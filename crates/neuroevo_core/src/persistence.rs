//! Genotype persistence
//!
//! A saved network is its topology plus the flat genotype vector. Rebuilding
//! from a record reproduces the original forward pass exactly.
//!
//! Two encodings are supported:
//! ```text
//! JSON:   {"hidden_layer_count":1,"input_count":5,"hidden_width":4,"output_count":2,"weights":[...]}
//! Binary: [hidden_layer_count: i32 LE][input_count: i32 LE][hidden_width: i32 LE][output_count: i32 LE]
//!         [weight: f64 LE] * N
//! ```
//!
//! [`GenomeStore`] abstracts where records live, so a "best network so far"
//! is an explicit store handed around by the caller.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{NetworkError, StoreError};
use crate::network::{NeuralNetwork, Topology};

const HEADER_BYTES: usize = 4 * 4;

/// Topology metadata plus the flat genotype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub hidden_layer_count: usize,
    pub input_count: usize,
    pub hidden_width: usize,
    pub output_count: usize,
    pub weights: Vec<f64>,
}

impl GenomeRecord {
    pub fn topology(&self) -> Topology {
        Topology::new(
            self.hidden_layer_count,
            self.input_count,
            self.hidden_width,
            self.output_count,
        )
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::with_capacity(HEADER_BYTES + self.weights.len() * 8);
        for (name, field) in [
            ("hidden_layer_count", self.hidden_layer_count),
            ("input_count", self.input_count),
            ("hidden_width", self.hidden_width),
            ("output_count", self.output_count),
        ] {
            let value = i32::try_from(field).map_err(|_| {
                NetworkError::InvalidTopology(format!("{name} = {field} does not fit the binary header"))
            })?;
            buf.write_i32::<LittleEndian>(value)?;
        }
        for &w in &self.weights {
            buf.write_f64::<LittleEndian>(w)?;
        }
        Ok(buf)
    }

    /// Decode the binary layout. A trailing partial weight (fewer than 8
    /// bytes) is ignored; the weight count itself is checked on load.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < HEADER_BYTES {
            return Err(StoreError::Truncated(bytes.len()));
        }
        let mut reader = Cursor::new(bytes);
        let mut header = [0usize; 4];
        for slot in header.iter_mut() {
            let raw = reader.read_i32::<LittleEndian>()?;
            *slot = usize::try_from(raw).map_err(|_| {
                NetworkError::InvalidTopology(format!("negative count {raw} in binary header"))
            })?;
        }

        let count = (bytes.len() - HEADER_BYTES) / 8;
        let mut weights = Vec::with_capacity(count);
        for _ in 0..count {
            weights.push(reader.read_f64::<LittleEndian>()?);
        }

        Ok(GenomeRecord {
            hidden_layer_count: header[0],
            input_count: header[1],
            hidden_width: header[2],
            output_count: header[3],
            weights,
        })
    }
}

impl NeuralNetwork {
    /// Snapshot this network as a persistable record.
    pub fn to_record(&self) -> GenomeRecord {
        let topology = self.topology();
        GenomeRecord {
            hidden_layer_count: topology.hidden_layers,
            input_count: topology.inputs,
            hidden_width: topology.hidden_width,
            output_count: topology.outputs,
            weights: self.flatten_weights(),
        }
    }

    /// Rebuild a network from a record.
    ///
    /// Fails with `InvalidTopology` for zero or oversized counts and `CorruptGenotype`
    /// when the weight vector length disagrees with the topology.
    pub fn from_record(record: &GenomeRecord) -> Result<Self, NetworkError> {
        let topology = record.topology();
        topology.validate()?;
        let expected = topology.weight_count();
        if record.weights.len() != expected {
            return Err(NetworkError::CorruptGenotype {
                expected,
                actual: record.weights.len(),
            });
        }
        let mut net = NeuralNetwork::zeroed(topology)?;
        net.unflatten_weights(&record.weights)?;
        Ok(net)
    }
}

/// Where genotype records are kept between runs.
pub trait GenomeStore {
    /// Persist `record`, replacing whatever was stored before.
    fn save(&mut self, record: &GenomeRecord) -> Result<(), StoreError>;

    /// Load the stored record, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<GenomeRecord>, StoreError>;
}

/// In-process store; holds at most one record.
#[derive(Clone, Debug, Default)]
pub struct MemoryGenomeStore {
    record: Option<GenomeRecord>,
}

impl MemoryGenomeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GenomeStore for MemoryGenomeStore {
    fn save(&mut self, record: &GenomeRecord) -> Result<(), StoreError> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<GenomeRecord>, StoreError> {
        Ok(self.record.clone())
    }
}

/// Pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GenomeStore for JsonFileStore {
    fn save(&mut self, record: &GenomeRecord) -> Result<(), StoreError> {
        fs::write(&self.path, record.to_json()?)?;
        debug!(path = %self.path.display(), weights = record.weights.len(), "Genome saved (json)");
        Ok(())
    }

    fn load(&self) -> Result<Option<GenomeRecord>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(GenomeRecord::from_json(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Compact little-endian binary file.
#[derive(Clone, Debug)]
pub struct BinaryFileStore {
    path: PathBuf,
}

impl BinaryFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GenomeStore for BinaryFileStore {
    fn save(&mut self, record: &GenomeRecord) -> Result<(), StoreError> {
        fs::write(&self.path, record.to_bytes()?)?;
        debug!(path = %self.path.display(), weights = record.weights.len(), "Genome saved (binary)");
        Ok(())
    }

    fn load(&self) -> Result<Option<GenomeRecord>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(GenomeRecord::from_bytes(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

//! Time series sinks.
//!
//! A run declares one spatial coordinate and the variables defined over it, then
//! appends one slot to the (unbounded) time axis per call to [`Storage::save`].

use std::{
    fs,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use bytemuck::{bytes_of, pod_read_unaligned};
use faer_core::MatRef;

use crate::{faer_add::column_to_vec, Float, Scheme, SimError};

pub trait Storage {
    type Artifact;

    fn declare_coordinates(&mut self, name: &str, values: MatRef<'_, Float>)
        -> Result<(), SimError>;

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError>;

    /// Appends `time` to the time axis and writes each named column in that slot.
    /// Declared variables missing from `vars` are left unset (NaN).
    fn save(&mut self, time: Float, vars: &[(&str, MatRef<'_, Float>)]) -> Result<(), SimError>;

    fn finish(self) -> Result<Self::Artifact, SimError>;
}

/// Lends a sink to a run, the caller keeps ownership and finishes it.
impl<S: Storage> Storage for &mut S {
    type Artifact = ();

    fn declare_coordinates(
        &mut self,
        name: &str,
        values: MatRef<'_, Float>,
    ) -> Result<(), SimError> {
        (**self).declare_coordinates(name, values)
    }

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError> {
        (**self).declare_variables(names)
    }

    fn save(&mut self, time: Float, vars: &[(&str, MatRef<'_, Float>)]) -> Result<(), SimError> {
        (**self).save(time, vars)
    }

    fn finish(self) -> Result<Self::Artifact, SimError> {
        Ok(())
    }
}

/// `advection1D-<scheme id>` for discrete runs, `advection1D-exact` otherwise.
pub fn artifact_name(scheme: Option<Scheme>) -> String {
    match scheme {
        Some(scheme) => format!("advection1D-{}", scheme.id()),
        None => "advection1D-exact".to_string(),
    }
}

/// Descriptive attributes stored alongside a time series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub institution: String,
    pub source: String,
    pub references: String,
    /// Creation time in unix seconds, stamped by the writer when unset.
    pub created: Option<u64>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_references(mut self, references: impl Into<String>) -> Self {
        self.references = references.into();
        self
    }

    pub fn with_created(mut self, unix_seconds: u64) -> Self {
        self.created = Some(unix_seconds);
        self
    }

    fn fields(&self) -> [&str; 6] {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.author.as_str(),
            self.institution.as_str(),
            self.source.as_str(),
            self.references.as_str(),
        ]
    }
}

// coordinate and variable declarations shared by every sink
#[derive(Debug, Clone, Default, PartialEq)]
struct Layout {
    coordinate: Option<(String, usize)>,
    variables: Vec<String>,
}

impl Layout {
    fn declare_coordinates(&mut self, name: &str, len: usize) -> Result<(), SimError> {
        if self.coordinate.is_some() {
            return Err(SimError::InvalidConfig(
                "coordinates were already declared".to_string(),
            ));
        }
        self.coordinate = Some((name.to_string(), len));
        Ok(())
    }

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError> {
        if self.coordinate.is_none() {
            return Err(SimError::InvalidConfig(
                "variables must be declared after the coordinates".to_string(),
            ));
        }
        for name in names {
            if self.variables.iter().any(|v| v == name) {
                return Err(SimError::InvalidConfig(format!(
                    "variable `{name}` declared twice"
                )));
            }
            self.variables.push(name.to_string());
        }
        Ok(())
    }

    // index of each variable of `vars` in the declaration order
    fn resolve(&self, vars: &[(&str, MatRef<'_, Float>)]) -> Result<Vec<usize>, SimError> {
        let len = self.coordinate.as_ref().map_or(0, |(_, len)| *len);
        vars.iter()
            .map(|(name, values)| {
                let index = self
                    .variables
                    .iter()
                    .position(|v| v == name)
                    .ok_or_else(|| SimError::VariableNotFound(name.to_string()))?;
                if values.nrows() != len || values.ncols() != 1 {
                    return Err(SimError::InvalidConfig(format!(
                        "variable `{name}` has shape {}x{}, expected {len}x1",
                        values.nrows(),
                        values.ncols()
                    )));
                }
                Ok(index)
            })
            .collect()
    }
}

/// A persisted time series: one coordinate axis, the time axis, and one
/// `times × coordinates` table per variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    coordinate_name: String,
    coordinates: Vec<Float>,
    times: Vec<Float>,
    variables: Vec<(String, Vec<Vec<Float>>)>,
}

impl TimeSeries {
    pub fn coordinate_name(&self) -> &str {
        &self.coordinate_name
    }

    pub fn coordinates(&self) -> &[Float] {
        &self.coordinates
    }

    /// Length of the time axis.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Float] {
        &self.times
    }

    pub fn time(&self, slot: usize) -> Option<Float> {
        self.times.get(slot).copied()
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    /// Every snapshot of `name`, in time order.
    pub fn variable(&self, name: &str) -> Option<&[Vec<Float>]> {
        self.variables
            .iter()
            .find(|(v, _)| v == name)
            .map(|(_, snapshots)| snapshots.as_slice())
    }

    pub fn values(&self, name: &str, slot: usize) -> Option<&[Float]> {
        self.variable(name)?.get(slot).map(Vec::as_slice)
    }

    pub fn last(&self, name: &str) -> Option<&[Float]> {
        self.variable(name)?.last().map(Vec::as_slice)
    }

    fn declare(&mut self, layout: &Layout) {
        if let Some((name, len)) = &layout.coordinate {
            self.coordinate_name = name.clone();
            self.coordinates.resize(*len, Float::NAN);
        }
        for name in layout.variables.iter().skip(self.variables.len()) {
            self.variables.push((name.clone(), Vec::new()));
        }
    }

    fn push(&mut self, time: Float, columns: Vec<(usize, Vec<Float>)>) {
        let len = self.coordinates.len();
        self.times.push(time);
        for (_, snapshots) in self.variables.iter_mut() {
            snapshots.push(vec![Float::NAN; len]);
        }
        for (index, values) in columns {
            if let Some(slot) = self.variables[index].1.last_mut() {
                *slot = values;
            }
        }
    }
}

/// Keeps the whole time series in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    layout: Layout,
    series: TimeSeries,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }
}

impl Storage for MemoryStorage {
    type Artifact = TimeSeries;

    fn declare_coordinates(
        &mut self,
        name: &str,
        values: MatRef<'_, Float>,
    ) -> Result<(), SimError> {
        self.layout.declare_coordinates(name, values.nrows())?;
        self.series.declare(&self.layout);
        self.series.coordinates = column_to_vec(values);
        Ok(())
    }

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError> {
        self.layout.declare_variables(names)?;
        self.series.declare(&self.layout);
        Ok(())
    }

    fn save(&mut self, time: Float, vars: &[(&str, MatRef<'_, Float>)]) -> Result<(), SimError> {
        let indices = self.layout.resolve(vars)?;
        let columns = indices
            .into_iter()
            .zip(vars)
            .map(|(index, (_, values))| (index, column_to_vec(*values)))
            .collect();
        self.series.push(time, columns);
        Ok(())
    }

    fn finish(self) -> Result<Self::Artifact, SimError> {
        Ok(self.series)
    }
}

// ATS1 layout, every number in native byte order:
//   "ATS1" | float size (u8) | creation time (u64, unix seconds) | 6 metadata strings
//   'C' name n x[0..n]                     coordinates
//   'V' count name...                      variables
//   'S' t count (index u[0..n])...         one per snapshot
//   'E' 0xFFFFFFFF                         end of series
// strings are a u32 byte length followed by UTF-8 bytes
const ATS1_HEADER: &[u8] = b"ATS1";
const COORDINATES_TAG: u8 = b'C';
const VARIABLES_TAG: u8 = b'V';
const SNAPSHOT_TAG: u8 = b'S';
const END_TAG: u8 = b'E';
const END_MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

fn write_str(output: &mut impl Write, s: &str) -> io::Result<()> {
    output.write_all(bytes_of(&(s.len() as u32)))?;
    output.write_all(s.as_bytes())
}

/// Streams a time series to any [`Write`] in the ATS1 binary format.
pub struct AtsWriter<W: Write> {
    output: W,
    layout: Layout,
}

impl<W: Write> AtsWriter<W> {
    pub fn new(mut output: W, metadata: &Metadata) -> Result<Self, SimError> {
        let created = metadata.created.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        output.write_all(ATS1_HEADER)?;
        output.write_all(bytes_of(&(std::mem::size_of::<Float>() as u8)))?;
        output.write_all(bytes_of(&created))?;
        for field in metadata.fields() {
            write_str(&mut output, field)?;
        }

        Ok(Self {
            output,
            layout: Layout::default(),
        })
    }
}

impl<W: Write> Storage for AtsWriter<W> {
    type Artifact = W;

    fn declare_coordinates(
        &mut self,
        name: &str,
        values: MatRef<'_, Float>,
    ) -> Result<(), SimError> {
        self.layout.declare_coordinates(name, values.nrows())?;

        let output = &mut self.output;
        output.write_all(&[COORDINATES_TAG])?;
        write_str(output, name)?;
        output.write_all(bytes_of(&(values.nrows() as u32)))?;
        output.write_all(bytemuck::cast_slice(&column_to_vec(values)))?;
        Ok(())
    }

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError> {
        self.layout.declare_variables(names)?;

        let output = &mut self.output;
        output.write_all(&[VARIABLES_TAG])?;
        output.write_all(bytes_of(&(names.len() as u32)))?;
        for name in names {
            write_str(output, name)?;
        }
        Ok(())
    }

    fn save(&mut self, time: Float, vars: &[(&str, MatRef<'_, Float>)]) -> Result<(), SimError> {
        let indices = self.layout.resolve(vars)?;

        let output = &mut self.output;
        output.write_all(&[SNAPSHOT_TAG])?;
        output.write_all(bytes_of(&time))?;
        output.write_all(bytes_of(&(vars.len() as u32)))?;
        for (index, (_, values)) in indices.into_iter().zip(vars) {
            output.write_all(bytes_of(&(index as u32)))?;
            output.write_all(bytemuck::cast_slice(&column_to_vec(*values)))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Self::Artifact, SimError> {
        self.output.write_all(&[END_TAG])?;
        self.output.write_all(&END_MARKER)?;
        self.output.flush()?;
        Ok(self.output)
    }
}

/// ATS1 time series written to `<dir>/<name>.ats`.
pub struct FileStorage {
    path: PathBuf,
    writer: AtsWriter<BufWriter<fs::File>>,
}

impl FileStorage {
    pub const EXTENSION: &'static str = "ats";

    pub fn create(
        dir: impl AsRef<Path>,
        name: &str,
        metadata: &Metadata,
    ) -> Result<Self, SimError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(name).with_extension(Self::EXTENSION);
        let writer = AtsWriter::new(BufWriter::new(fs::File::create(&path)?), metadata)?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    type Artifact = PathBuf;

    fn declare_coordinates(
        &mut self,
        name: &str,
        values: MatRef<'_, Float>,
    ) -> Result<(), SimError> {
        self.writer.declare_coordinates(name, values)
    }

    fn declare_variables(&mut self, names: &[&str]) -> Result<(), SimError> {
        self.writer.declare_variables(names)
    }

    fn save(&mut self, time: Float, vars: &[(&str, MatRef<'_, Float>)]) -> Result<(), SimError> {
        self.writer.save(time, vars)
    }

    fn finish(self) -> Result<Self::Artifact, SimError> {
        self.writer.finish()?;
        Ok(self.path)
    }
}

struct AtsReader<R> {
    input: R,
}

impl<R: Read> AtsReader<R> {
    // lengths come from the stream, only grow the buffer with bytes actually read
    fn bytes(&mut self, n: usize) -> Result<Vec<u8>, SimError> {
        let mut buf = Vec::new();
        (&mut self.input).take(n as u64).read_to_end(&mut buf)?;
        if buf.len() != n {
            return Err(SimError::Format(format!(
                "unexpected end of stream ({} of {n} bytes)",
                buf.len()
            )));
        }
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, SimError> {
        Ok(self.bytes(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, SimError> {
        Ok(pod_read_unaligned(&self.bytes(4)?))
    }

    fn u64(&mut self) -> Result<u64, SimError> {
        Ok(pod_read_unaligned(&self.bytes(8)?))
    }

    fn float(&mut self) -> Result<Float, SimError> {
        Ok(pod_read_unaligned(&self.bytes(8)?))
    }

    fn floats(&mut self, n: usize) -> Result<Vec<Float>, SimError> {
        let size = n
            .checked_mul(8)
            .ok_or_else(|| SimError::Format(format!("column of {n} values is too large")))?;
        Ok(self
            .bytes(size)?
            .chunks_exact(8)
            .map(pod_read_unaligned)
            .collect())
    }

    fn string(&mut self) -> Result<String, SimError> {
        let len = self.u32()? as usize;
        String::from_utf8(self.bytes(len)?)
            .map_err(|e| SimError::Format(format!("invalid string: {e}")))
    }
}

/// Parses an ATS1 stream back into its metadata and time series.
pub fn read_time_series(input: impl Read) -> Result<(Metadata, TimeSeries), SimError> {
    let mut r = AtsReader { input };

    if r.bytes(ATS1_HEADER.len())? != ATS1_HEADER {
        return Err(SimError::Format("missing ATS1 header".to_string()));
    }
    let float_size = r.u8()?;
    if float_size as usize != std::mem::size_of::<Float>() {
        return Err(SimError::Format(format!(
            "unsupported float size {float_size}"
        )));
    }
    let created = r.u64()?;
    let metadata = Metadata {
        title: r.string()?,
        description: r.string()?,
        author: r.string()?,
        institution: r.string()?,
        source: r.string()?,
        references: r.string()?,
        created: Some(created),
    };

    let mut layout = Layout::default();
    let mut series = TimeSeries::default();
    loop {
        match r.u8()? {
            COORDINATES_TAG => {
                let name = r.string()?;
                let len = r.u32()? as usize;
                let coordinates = r.floats(len)?;
                layout.declare_coordinates(&name, len)?;
                series.declare(&layout);
                series.coordinates = coordinates;
            }
            VARIABLES_TAG => {
                let count = r.u32()?;
                let names = (0..count)
                    .map(|_| r.string())
                    .collect::<Result<Vec<_>, _>>()?;
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                layout.declare_variables(&names)?;
                series.declare(&layout);
            }
            SNAPSHOT_TAG => {
                let time = r.float()?;
                let count = r.u32()?;
                let len = series.coordinates.len();
                let mut columns = Vec::new();
                for _ in 0..count {
                    let index = r.u32()? as usize;
                    if index >= layout.variables.len() {
                        return Err(SimError::Format(format!(
                            "snapshot refers to undeclared variable #{index}"
                        )));
                    }
                    columns.push((index, r.floats(len)?));
                }
                series.push(time, columns);
            }
            END_TAG => {
                if r.bytes(END_MARKER.len())? != END_MARKER {
                    return Err(SimError::Format("corrupted end marker".to_string()));
                }
                break;
            }
            tag => return Err(SimError::Format(format!("unknown record tag {tag:#04x}"))),
        }
    }

    Ok((metadata, series))
}

pub fn open_time_series(path: impl AsRef<Path>) -> Result<(Metadata, TimeSeries), SimError> {
    read_time_series(BufReader::new(fs::File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faer_add::column_from_slice;

    #[test]
    fn each_save_appends_one_slot() {
        let x = column_from_slice(&[0.0, 0.5, 1.0]);
        let u = column_from_slice(&[1.0, 2.0, 3.0]);

        let mut storage = MemoryStorage::new();
        storage.declare_coordinates("x", x.as_ref()).unwrap();
        storage.declare_variables(&["u", "v"]).unwrap();
        storage.save(0.0, &[("u", u.as_ref())]).unwrap();
        storage.save(0.1, &[("u", u.as_ref()), ("v", x.as_ref())]).unwrap();

        let series = storage.finish().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.times(), &[0.0, 0.1]);
        assert_eq!(series.values("u", 1), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(series.values("v", 1), Some(&[0.0, 0.5, 1.0][..]));
        assert!(series.values("v", 0).unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn saving_an_undeclared_variable_fails() {
        let x = column_from_slice(&[0.0, 0.5, 1.0]);
        let mut storage = MemoryStorage::new();
        storage.declare_coordinates("x", x.as_ref()).unwrap();
        storage.declare_variables(&["u"]).unwrap();

        match storage.save(0.0, &[("w", x.as_ref())]) {
            Err(SimError::VariableNotFound(name)) => assert_eq!(name, "w"),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(storage.series().is_empty());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let x = column_from_slice(&[0.0, 0.5, 1.0]);
        let u = column_from_slice(&[1.0, 2.0]);
        let mut storage = MemoryStorage::new();
        storage.declare_coordinates("x", x.as_ref()).unwrap();
        storage.declare_variables(&["u"]).unwrap();
        assert!(matches!(
            storage.save(0.0, &[("u", u.as_ref())]),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn variables_need_coordinates() {
        let mut storage = MemoryStorage::new();
        assert!(matches!(
            storage.declare_variables(&["u"]),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn ats1_stream_reads_back() {
        let x = column_from_slice(&[-1.0, 0.0, 1.0]);
        let u = column_from_slice(&[1.0, 0.5, 0.0]);
        let metadata = Metadata::new("Advection simulation by method cir")
            .with_author("someone")
            .with_created(1_700_000_000)
            .with_references("LeVeque, Randall J.: Numerical Methods for Conservation Laws 1992");

        let mut writer = AtsWriter::new(Vec::new(), &metadata).unwrap();
        writer.declare_coordinates("x", x.as_ref()).unwrap();
        writer.declare_variables(&["u"]).unwrap();
        writer.save(0.0, &[("u", u.as_ref())]).unwrap();
        writer.save(0.25, &[("u", x.as_ref())]).unwrap();
        let bytes = writer.finish().unwrap();

        let (read_metadata, series) = read_time_series(bytes.as_slice()).unwrap();
        assert_eq!(read_metadata, metadata);
        assert_eq!(series.coordinate_name(), "x");
        assert_eq!(series.coordinates(), &[-1.0, 0.0, 1.0]);
        assert_eq!(series.times(), &[0.0, 0.25]);
        assert_eq!(series.values("u", 0), Some(&[1.0, 0.5, 0.0][..]));
        assert_eq!(series.last("u"), Some(&[-1.0, 0.0, 1.0][..]));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let x = column_from_slice(&[-1.0, 0.0, 1.0]);
        let mut writer = AtsWriter::new(Vec::new(), &Metadata::default()).unwrap();
        writer.declare_coordinates("x", x.as_ref()).unwrap();
        let bytes = writer.output;
        assert!(read_time_series(bytes.as_slice()).is_err());
        assert!(matches!(
            read_time_series(&b"NOPE"[..]),
            Err(SimError::Format(_))
        ));
    }

    #[test]
    fn oversized_lengths_are_a_format_error() {
        let mut bytes = AtsWriter::new(Vec::new(), &Metadata::default())
            .unwrap()
            .output;
        bytes.push(COORDINATES_TAG);
        write_str(&mut bytes, "x").unwrap();
        bytes.extend_from_slice(bytes_of(&u32::MAX));
        bytes.extend_from_slice(bytemuck::cast_slice(&[0.0 as Float; 4]));

        assert!(matches!(
            read_time_series(bytes.as_slice()),
            Err(SimError::Format(_))
        ));
    }

    #[test]
    fn unset_creation_time_is_stamped_on_write() {
        let bytes = AtsWriter::new(Vec::new(), &Metadata::new("t"))
            .unwrap()
            .finish()
            .unwrap();
        let (metadata, series) = read_time_series(bytes.as_slice()).unwrap();
        assert!(metadata.created.is_some_and(|t| t > 0));
        assert!(series.is_empty());
    }

    #[test]
    fn artifact_names_embed_the_scheme() {
        assert_eq!(artifact_name(Some(Scheme::Fromm)), "advection1D-fromm");
        assert_eq!(artifact_name(None), "advection1D-exact");
    }
}

//! Function libraries: compiled WGSL modules with name-based entry point lookup.
//!
//! A library is built once from WGSL source. Entry points come from naga's
//! parse of that source, the same front end wgpu compiles it with. Pipelines
//! are created from the functions a library hands out, so a misspelled entry
//! point name is reported as an [`InitializationError`] before any pipeline
//! is built.

use std::fmt;

use wgpu::{Device, ShaderModule};

use super::error::InitializationError;

/// Pipeline stage a GPU function is declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Compute,
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn from_naga(stage: naga::ShaderStage) -> Option<Self> {
        match stage {
            naga::ShaderStage::Compute => Some(Self::Compute),
            naga::ShaderStage::Vertex => Some(Self::Vertex),
            naga::ShaderStage::Fragment => Some(Self::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compute => "compute",
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// A named entry point declared in a library's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub stage: ShaderStage,
}

/// Table of entry points declared in a WGSL source.
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    library: String,
    entries: Vec<EntryPoint>,
}

impl EntryTable {
    /// Parse WGSL source and collect its `@compute`, `@vertex` and `@fragment` functions.
    pub fn parse(library: &str, source: &str) -> Result<Self, InitializationError> {
        let module =
            naga::front::wgsl::parse_str(source).map_err(|e| InitializationError::ShaderParse {
                library: library.to_string(),
                message: e.emit_to_string(source),
            })?;

        let entries = module
            .entry_points
            .into_iter()
            .filter_map(|ep| {
                let stage = ShaderStage::from_naga(ep.stage)?;
                Some(EntryPoint {
                    name: ep.name,
                    stage,
                })
            })
            .collect();

        Ok(Self {
            library: library.to_string(),
            entries,
        })
    }

    pub fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }

    /// Look up `name` and check that it was declared for `stage`.
    pub fn lookup(&self, name: &str, stage: ShaderStage) -> Result<&EntryPoint, InitializationError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| InitializationError::MissingFunction {
                library: self.library.clone(),
                name: name.to_string(),
            })?;

        if entry.stage != stage {
            return Err(InitializationError::WrongStage {
                name: name.to_string(),
                expected: stage,
                actual: entry.stage,
            });
        }
        Ok(entry)
    }
}

/// A compiled shader module plus its entry point table.
pub struct FunctionLibrary {
    module: ShaderModule,
    table: EntryTable,
}

/// A GPU function resolved from a [`FunctionLibrary`].
#[derive(Clone, Copy)]
pub struct Function<'a> {
    pub module: &'a ShaderModule,
    pub name: &'a str,
    pub stage: ShaderStage,
}

impl FunctionLibrary {
    /// Compile `source` into a library named `label`.
    ///
    /// The source is parsed before it reaches the device, so malformed WGSL
    /// is reported as an error instead of a validation panic.
    pub fn from_wgsl(device: &Device, label: &str, source: &str) -> Result<Self, InitializationError> {
        let table = EntryTable::parse(label, source)?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        log::debug!(
            "Loaded function library {} with {} entry points",
            label,
            table.entries().len()
        );

        Ok(Self { module, table })
    }

    pub fn module(&self) -> &ShaderModule {
        &self.module
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.table.entries().iter().map(|e| e.name.as_str())
    }

    /// Resolve a function by name for the given stage.
    pub fn function(
        &self,
        name: &str,
        stage: ShaderStage,
    ) -> Result<Function<'_>, InitializationError> {
        let entry = self.table.lookup(name, stage)?;
        Ok(Function {
            module: &self.module,
            name: &entry.name,
            stage,
        })
    }
}

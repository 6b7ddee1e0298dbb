use super::{DocumentBuilder, Subsystem};
use crate::error::{PdfError, Result};
use crate::objects::{Object, ObjectId};
use crate::pdf_dict;
use tracing::debug;

/// One optional-content configuration dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcConfigSpec {
    /// `/Name` of the configuration. `None` leaves the entry out.
    pub name: Option<String>,
}

impl OcConfigSpec {
    pub fn unnamed() -> Self {
        Self { name: None }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionalContentSpec {
    /// OCG names, one group each.
    pub groups: Vec<String>,
    pub configs: Vec<OcConfigSpec>,
    /// Index into `configs` of the configuration used as `/D`.
    pub default_config: usize,
}

/// Handles of the objects [`DocumentBuilder::attach_optional_content`] created.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalContent {
    pub groups: Vec<ObjectId>,
    pub configs: Vec<ObjectId>,
    pub default_config: ObjectId,
}

impl DocumentBuilder {
    /// Allocates every OCG and configuration and installs the catalog's
    /// `/OCProperties`.
    ///
    /// Each configuration lists every group in `/OCGs`. The default
    /// configuration is both `/D` and a member of `/Configs`, pointing at the
    /// same indirect object.
    pub fn attach_optional_content(
        &mut self,
        spec: &OptionalContentSpec,
    ) -> Result<OptionalContent> {
        if spec.default_config >= spec.configs.len() {
            return Err(PdfError::InvalidStructure(format!(
                "default configuration {} out of range for {} configurations",
                spec.default_config,
                spec.configs.len()
            )));
        }
        self.claim(Subsystem::OptionalContent)?;

        let mut groups = Vec::with_capacity(spec.groups.len());
        for name in &spec.groups {
            groups.push(self.graph.allocate(pdf_dict! {
                "Type" => Object::name("OCG"),
                "Name" => name.as_str(),
            })?);
        }
        let group_refs: Vec<Object> = groups.iter().copied().map(Object::Reference).collect();

        let mut configs = Vec::with_capacity(spec.configs.len());
        for config in &spec.configs {
            let mut dict = pdf_dict! { "Type" => Object::name("OCConfig") };
            if let Some(name) = &config.name {
                dict.set("Name", name.as_str());
            }
            dict.set("OCGs", group_refs.clone());
            configs.push(self.graph.allocate(dict)?);
        }
        let default_config = configs[spec.default_config];

        let properties = pdf_dict! {
            "OCGs" => group_refs,
            "Configs" => configs.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
            "D" => default_config,
        };
        self.catalog_mut()?.set("OCProperties", properties);
        debug!(
            groups = groups.len(),
            configs = configs.len(),
            default = %default_config,
            "attached optional content"
        );

        Ok(OptionalContent {
            groups,
            configs,
            default_config,
        })
    }
}

//! Structured description of a region's option list.

use std::fmt;

use crate::option::{ActiveFields, Capability};

/// One option's entry in an [`OptionsReport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSummary {
    /// Option name.
    pub name: String,
    /// Registered type name.
    pub type_name: String,
    /// Declared fields.
    pub active: ActiveFields,
}

/// What an option list holds, in registration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionsReport {
    /// Region the list belongs to.
    pub region: String,
    /// One summary per option.
    pub options: Vec<OptionSummary>,
}

impl fmt::Display for OptionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.is_empty() {
            return write!(f, "region '{}': no finite volume options", self.region);
        }
        write!(
            f,
            "region '{}': {} finite volume option(s)",
            self.region,
            self.options.len()
        )?;
        for opt in &self.options {
            write!(f, "\n  {} ({})", opt.name, opt.type_name)?;
            for cap in Capability::ALL {
                let fields = opt.active.fields(cap);
                if !fields.is_empty() {
                    let list: Vec<&str> = fields.iter().map(String::as_str).collect();
                    write!(f, "\n    {cap}: {}", list.join(" "))?;
                }
            }
        }
        Ok(())
    }
}

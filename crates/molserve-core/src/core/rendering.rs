//! Fixed rendering style applied to the root selection of every viewer session.

use phf::phf_map;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// CPK-style colour per element symbol. Elements not listed fall back to the
/// viewer's own default colour.
pub static CPK_COLOURS: phf::Map<&'static str, &'static str> = phf_map! {
    "O" => "red",
    "N" => "blue",
    "H" => "white",
    "Cl" => "green",
    "S" => "yellow",
    "C" => "black",
    "F" => "grey",
    "K" => "#08F0F3",
    "Cu" => "orange",
    "Br" => "#BFF308",
    "Li" => "#8B3E02",
    "Ca" => "#B104C2",
    "Mg" => "#568903",
    "Si" => "#F8F895",
    "I" => "#70BEBF",
    "P" => "pink",
};

/// How a viewer's grab gesture selects particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMethod {
    /// Interact with the single particle under the cursor.
    Single,
    /// Interact with the whole selection as a group.
    Group,
}

impl fmt::Display for InteractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMethod::Single => f.write_str("single"),
            InteractionMethod::Group => f.write_str("group"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColorScheme {
    Cpk { scheme: BTreeMap<String, String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Renderer {
    pub color: ColorScheme,
}

/// The shared selection covering every particle, as seen by all viewers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_method: Option<InteractionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,
}

/// A complete rendering configuration: interaction method plus CPK renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub interaction_method: InteractionMethod,
    pub renderer: Renderer,
}

impl RenderStyle {
    pub fn cpk(interaction_method: InteractionMethod) -> Self {
        let scheme = CPK_COLOURS
            .entries()
            .map(|(element, colour)| (element.to_string(), colour.to_string()))
            .collect();
        Self {
            interaction_method,
            renderer: Renderer {
                color: ColorScheme::Cpk { scheme },
            },
        }
    }

    /// Style used by plain visualization sessions.
    pub fn single() -> Self {
        Self::cpk(InteractionMethod::Single)
    }

    /// Style used by simulation sessions, where users pull whole groups.
    pub fn group() -> Self {
        Self::cpk(InteractionMethod::Group)
    }

    /// Overwrites both fields of the selection. Applying twice is a no-op.
    pub fn apply_to(&self, selection: &mut RootSelection) {
        selection.interaction_method = Some(self.interaction_method);
        selection.renderer = Some(self.renderer.clone());
    }
}

pub fn colour_for(element: &str) -> Option<&'static str> {
    CPK_COLOURS.get(element).copied()
}

// src/core/presets.rs — Tool panels and their preset instructions

use std::fmt;

/// Editing panels of the session. Each one is a different way of producing
/// an instruction for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Free-text instruction.
    #[default]
    Magic,
    Adjust,
    Filter,
    /// Expand canvas and upscale.
    Advanced,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Magic, Tool::Adjust, Tool::Filter, Tool::Advanced];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "magic" | "edit" => Some(Tool::Magic),
            "adjust" | "adjustment" => Some(Tool::Adjust),
            "filter" => Some(Tool::Filter),
            "advanced" | "expand" | "upscale" => Some(Tool::Advanced),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Magic => "magic",
            Tool::Adjust => "adjust",
            Tool::Filter => "filter",
            Tool::Advanced => "advanced",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tool::Magic => "Magic Edit",
            Tool::Adjust => "Adjust",
            Tool::Filter => "Filter",
            Tool::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub tool: Tool,
    pub key: &'static str,
    pub label: &'static str,
    pub instruction: &'static str,
}

pub const UPSCALE_INSTRUCTION: &str = "Upscale this image to a higher resolution, significantly enhancing details, sharpness, and overall clarity. The result should be a photorealistic version of the original image, free of artifacts.";

pub const PRESETS: &[Preset] = &[
    Preset {
        tool: Tool::Adjust,
        key: "blur-background",
        label: "Blur Background",
        instruction: "Apply a realistic depth-of-field effect, making the background blurry while keeping the main subject in sharp focus.",
    },
    Preset {
        tool: Tool::Adjust,
        key: "enhance",
        label: "Enhance Details",
        instruction: "Slightly enhance the sharpness and details of the image without making it look unnatural.",
    },
    Preset {
        tool: Tool::Adjust,
        key: "warm",
        label: "Warmer Lighting",
        instruction: "Adjust the color temperature to give the image warmer, golden-hour style lighting.",
    },
    Preset {
        tool: Tool::Adjust,
        key: "studio",
        label: "Studio Light",
        instruction: "Add dramatic, professional studio lighting to the main subject.",
    },
    Preset {
        tool: Tool::Filter,
        key: "synthwave",
        label: "Synthwave",
        instruction: "Apply a vibrant 80s synthwave aesthetic with neon magenta and cyan glows and subtle scan lines.",
    },
    Preset {
        tool: Tool::Filter,
        key: "anime",
        label: "Anime",
        instruction: "Give the image a vibrant Japanese anime style, with bold outlines, cel-shading, and saturated colors.",
    },
    Preset {
        tool: Tool::Filter,
        key: "lomo",
        label: "Lomo",
        instruction: "Apply a Lomography-style cross-processing film effect with high-contrast, oversaturated colors, and dark vignetting.",
    },
    Preset {
        tool: Tool::Filter,
        key: "glitch",
        label: "Glitch",
        instruction: "Transform the image into a futuristic holographic projection with digital glitch effects and chromatic aberration.",
    },
    Preset {
        tool: Tool::Advanced,
        key: "horizontal",
        label: "Expand Horizontal",
        instruction: "Expand the image horizontally, filling in the new areas on the left and right sides with content that seamlessly and realistically extends the original scene. Do not change the original content of the image.",
    },
    Preset {
        tool: Tool::Advanced,
        key: "vertical",
        label: "Expand Vertical",
        instruction: "Expand the image vertically, filling in the new areas on the top and bottom with content that seamlessly and realistically extends the original scene. Do not change the original content of the image.",
    },
    Preset {
        tool: Tool::Advanced,
        key: "all",
        label: "Expand All Sides",
        instruction: "Expand the image on all four sides, filling in the new areas with content that seamlessly and realistically extends the original scene. Do not change the original content of the image.",
    },
    Preset {
        tool: Tool::Advanced,
        key: "upscale",
        label: "Upscale",
        instruction: UPSCALE_INSTRUCTION,
    },
];

pub fn presets_for(tool: Tool) -> impl Iterator<Item = &'static Preset> {
    PRESETS.iter().filter(move |p| p.tool == tool)
}

pub fn find(tool: Tool, key: &str) -> Option<&'static Preset> {
    let key = key.trim().to_ascii_lowercase();
    presets_for(tool).find(|p| p.key == key)
}

/// Look a preset up by `tool:key` or by a bare key.
pub fn lookup(name: &str) -> Option<&'static Preset> {
    match name.split_once(':') {
        Some((tool, key)) => find(Tool::parse(tool)?, key),
        None => {
            let key = name.trim().to_ascii_lowercase();
            PRESETS.iter().find(|p| p.key == key)
        }
    }
}

/// Instruction for the adjustment panel: a preset key, or custom text
/// wrapped in the adjustment template.
pub fn adjustment_instruction(input: &str) -> String {
    match find(Tool::Adjust, input) {
        Some(p) => p.instruction.to_string(),
        None => format!(
            "Perform a natural, photorealistic adjustment to the entire image: {}. \
             Keep the composition and the subject unchanged.",
            input.trim()
        ),
    }
}

/// Instruction for the filter panel: a preset key, or custom text wrapped in
/// the filter template.
pub fn filter_instruction(input: &str) -> String {
    match find(Tool::Filter, input) {
        Some(p) => p.instruction.to_string(),
        None => format!(
            "Apply a stylistic filter to the entire image: {}. \
             Keep the composition and content recognisable.",
            input.trim()
        ),
    }
}

/// Instruction for expanding the canvas in `direction`
/// (`horizontal`, `vertical` or `all`).
pub fn expand_instruction(direction: &str) -> Option<&'static str> {
    let key = match direction.trim().to_ascii_lowercase().as_str() {
        "h" | "horizontal" => "horizontal",
        "v" | "vertical" => "vertical",
        "a" | "all" | "all-sides" => "all",
        _ => return None,
    };
    find(Tool::Advanced, key).map(|p| p.instruction)
}

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// (alias, backend model id, description)
const MODEL_ALIASES: &[(&str, &str, &str)] = &[
    ("base", "flux", "Base flux model."),
    ("realism", "flux-realism", "Flux with a LoRA fine tuned for realism."),
    ("3d", "flux-3d", "Flux with a LoRA fine tuned for 3d images."),
    ("anime", "flux-anime", "Flux with a LoRA fine tuned for anime style."),
    ("disney", "flux-disney", "Flux with a LoRA fine tuned for disney style."),
    ("pixel", "flux-pixel", "Flux with a LoRA fine tuned for pixelated style."),
    ("4o", "flux-4o", "Flux with a LoRA fine tuned on 4o outputs."),
    ("anydark", "any-dark", "AnyDark model, great for dark scenes."),
    ("pro", "flux.1.1-pro-ultra", "Flux 1.1 Pro Ultra model."),
    ("sd3", "stable-diffusion-3-large-turbo", "Stable Diffusion 3 large turbo model."),
    ("sdxl", "sdxl-lightning-4step", "Stable Diffusion XL lightning model."),
    ("kandinsky", "kandinsky-3.1", "Kandinsky 3.1 model."),
    ("deliberate3", "deliberate-v3", "Deliberate v3 model."),
    ("rdxl", "realdream-xl", "Realdream XL model."),
    ("jugg", "juggernaut-xl-v10", "Juggernaut XL v10 model."),
    (
        "half",
        "flux-half-illustration",
        "Flux Half Illustration LoRA. Use \"in the style of TOK\" to trigger half photo, half illustrated elements.",
    ),
    ("recraft", "recraft-v3", "Recraft V3."),
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    MODEL_ALIASES
        .iter()
        .map(|(alias, backend, _)| (*alias, *backend))
        .collect()
});

/// Backend model id for a user-facing alias. Matching ignores case.
pub fn resolve_alias(alias: &str) -> Option<&'static str> {
    ALIAS_TABLE.get(alias.to_lowercase().as_str()).copied()
}

/// Every known alias in display order, as (alias, backend id, description).
pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
    MODEL_ALIASES.to_vec()
}

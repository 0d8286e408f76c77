use std::env;

/// MCU features and whether their ADCSRB register carries MUX5.
const VARIANTS: &[(&str, bool)] = &[
    ("atmega168", false),
    ("atmega328p", false),
    ("atmega1280", true),
    ("atmega2560", true),
    ("atmega32u4", true),
    ("atmega1284p", false),
];

fn main() {
    println!("cargo::rustc-check-cfg=cfg(adc_mux5)");

    let selected: Vec<&(&str, bool)> = VARIANTS
        .iter()
        .filter(|(name, _)| {
            let var = format!("CARGO_FEATURE_{}", name.to_uppercase());
            env::var_os(var).is_some()
        })
        .collect();

    if selected.len() > 1 {
        let names: Vec<&str> = selected.iter().map(|(name, _)| *name).collect();
        panic!(
            "more than one target MCU feature enabled ({}); pick exactly one",
            names.join(", ")
        );
    }

    if let Some((_, true)) = selected.first() {
        println!("cargo::rustc-cfg=adc_mux5");
    }

    println!("cargo::rerun-if-changed=build.rs");
}

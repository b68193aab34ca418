fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link/env setup only applies to the device build; host
    // simulator and test builds have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

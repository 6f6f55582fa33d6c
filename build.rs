fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // MultitouchSupport is a private framework; it is not on the default
    // linker search path.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
        println!("cargo:rustc-link-search=framework=/System/Library/PrivateFrameworks");
    }
}

//! Prints every payload the `simple` method produces for a depth-6 Unix
//! traversal targeting `/etc/passwd`, then repeats the same generation with
//! the `any` method to show how much larger the combined family is.

use dotpath_fuzz::{generate, DetectionMethod, GenerateParams, OsType};

fn main() -> Result<(), dotpath_fuzz::FuzzError> {
    let mut simple = GenerateParams::new(OsType::Unix, 6, DetectionMethod::Simple);
    simple.target_file = Some("/etc/passwd".to_string());
    let simple_payloads = generate(&simple)?;

    println!("simple ({} payloads):", simple_payloads.len());
    for payload in &simple_payloads {
        println!("  {payload}");
    }

    let mut any = simple.clone();
    any.method = DetectionMethod::Any;
    let any_payloads = generate(&any)?;
    println!("\nany ({} payloads)", any_payloads.len());

    Ok(())
}

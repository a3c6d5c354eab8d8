//! Transcoding walkthrough
//!
//! Demonstrates:
//! - CP949 `^|` / `@@\n` export converted to UTF-8 CSV
//! - skipping a preamble and passing the header through
//! - a row processor
//! - Zstd compressed output
//!
//! With two arguments, transcodes `<input>` to `<output>` using the default
//! input dialect and a comma-separated UTF-8 output:
//!
//! ```text
//! cargo run --example transcode -- export.dat export.csv.zst
//! ```

use delimstream::{transcode_file, Charset, Dialect, Identity, Pipeline, PipelineConfig, Record};
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [input, output] = &args[..] {
        let pipeline = Pipeline::new(PipelineConfig::new().output(Dialect::csv()))?;
        let stats = transcode_file(&pipeline, input, output, Identity)?;
        println!("{} -> {}: {}", input, output, stats);
        return Ok(());
    }

    println!("=== Transcoding Examples ===\n");

    let cp949 = Charset::for_label("CP949")?;
    let dir = std::env::temp_dir().join("delimstream-demo");
    fs::create_dir_all(&dir)?;

    // Example 1: CP949 export with a two-line preamble
    println!("1. CP949 export to UTF-8 CSV...");
    let input = dir.join("users.dat");
    {
        let mut text = String::from("USER EXPORT@@\ngenerated 2024-01-01@@\nid^|name^|memo@@\n");
        for i in 1..=5 {
            text.push_str(&format!("{}^|사용자{}^|메모, 줄{}@@\n", i, i, i));
        }
        fs::write(&input, cp949.encode(&text))?;
    }

    let config = PipelineConfig::new()
        .input(Dialect::new().charset(cp949))
        .output(Dialect::csv())
        .skip_leading_rows(2)
        .read_header_after_skip(true)
        .expected_columns(3);
    let pipeline = Pipeline::new(config)?;

    let output = dir.join("users.csv");
    let stats = transcode_file(&pipeline, &input, &output, Identity)?;
    println!("   {}", stats);
    println!("{}", fs::read_to_string(&output)?);

    // Example 2: Row processor
    println!("2. Uppercasing names with a row processor...");
    let upper = |mut row: Record| -> delimstream::Result<Record> {
        if let Some(name) = row.get_mut(1) {
            *name = name.to_uppercase();
        }
        Ok(row)
    };
    let (text, _) = Pipeline::new(PipelineConfig::new().output(Dialect::csv()))?
        .transcode_str("1^|alice@@\n2^|bob@@\n", upper)?;
    println!("{}", text);

    // Example 3: Compressed output
    println!("3. Writing Zstd compressed output...");
    let packed = dir.join("users.csv.zst");
    let stats = transcode_file(&pipeline, &input, &packed, Identity)?;
    println!("   {} ({} bytes)", stats, fs::metadata(&packed)?.len());

    Ok(())
}

//! stegojpeg CLI - baseline JPEG codec and payload container utility.
//!
//! Encodes raw RGBA pixels to baseline JPEG, decodes back, inspects marker
//! structure, and wraps/unwraps the steganographic payload container.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

use stegojpeg_rs::jpeg_stream_reader::{Segment, parse_segments};
use stegojpeg_rs::{JpegDecoder, JpegEncoder, RgbaImage, container};

/// Baseline JPEG codec with a steganographic payload container
#[derive(Parser)]
#[command(name = "stegojpeg")]
#[command(author = "stegojpeg-rs contributors")]
#[command(version)]
#[command(about = "Encode, decode, and inspect baseline JPEG; wrap and unwrap payload containers", long_about = None)]
#[command(after_help = "EXAMPLES:
    stegojpeg encode -i pixels.rgba -o image.jpg -w 512 -H 512
    stegojpeg decode -i image.jpg -o pixels.rgba
    stegojpeg decode -i image.jpg -o image.ppm -f ppm
    stegojpeg info -i image.jpg
    stegojpeg wrap -i secret.bin -o framed.jstg -m '{\"name\":\"x\"}'
    stegojpeg unwrap -i framed.jstg -o secret.bin

Raw pixel input is interleaved 8-bit RGBA in raster order.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw RGBA pixels to a baseline JPEG
    #[command(visible_alias = "e")]
    Encode {
        /// Input raw RGBA pixel file
        #[arg(short, long, help = "Path to raw RGBA pixel data")]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long, help = "Path for the encoded output file")]
        output: PathBuf,

        /// Image width in pixels
        #[arg(short, long)]
        width: u32,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: u32,

        /// Quality level (1-100, reserved; v1 encodes with standard tables)
        #[arg(short, long, default_value = "85")]
        quality: u8,

        /// Restart marker interval in MCUs (0 disables)
        #[arg(long, default_value = "0")]
        restart_interval: u16,

        /// Wrap the encoded stream in a payload container
        #[arg(short, long)]
        container: bool,
    },

    /// Decode a baseline JPEG to raw pixels or PPM
    #[command(visible_alias = "d")]
    Decode {
        /// Input JPEG file
        #[arg(short, long, help = "Path to the input image file")]
        input: PathBuf,

        /// Output file path for decoded pixels
        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        /// Output format: raw RGBA or PPM (alpha dropped)
        #[arg(short, long, default_value = "raw", value_enum)]
        format: OutputFormat,
    },

    /// Display marker structure and metadata of a JPEG file
    #[command(visible_alias = "i")]
    Info {
        /// Input file path
        #[arg(short, long, help = "Path to the image file to inspect")]
        input: PathBuf,
    },

    /// Wrap a payload file in a self-describing container
    #[command(visible_alias = "w")]
    Wrap {
        /// Payload file
        #[arg(short, long)]
        input: PathBuf,

        /// Output container file
        #[arg(short, long)]
        output: PathBuf,

        /// Metadata as an inline JSON document
        #[arg(short, long, default_value = "{}")]
        metadata: String,

        /// Flags byte (bit 0 encrypted, bit 1 compressed, bit 2 chunked)
        #[arg(short, long, default_value = "0")]
        flags: u8,
    },

    /// Unwrap a container, verifying its CRC, and extract the payload
    #[command(visible_alias = "u")]
    Unwrap {
        /// Input container file
        #[arg(short, long)]
        input: PathBuf,

        /// Output payload file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Raw interleaved RGBA
    Raw,
    /// Portable PixMap (P6)
    Ppm,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            quality,
            restart_interval,
            container,
        } => encode_image(&input, &output, width, height, quality, restart_interval, container),
        Commands::Decode {
            input,
            output,
            format,
        } => decode_image(&input, &output, &format),
        Commands::Info { input } => show_info(&input),
        Commands::Wrap {
            input,
            output,
            metadata,
            flags,
        } => wrap_payload(&input, &output, &metadata, flags),
        Commands::Unwrap { input, output } => unwrap_payload(&input, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn encode_image(
    input: &PathBuf,
    output: &PathBuf,
    width: u32,
    height: u32,
    quality: u8,
    restart_interval: u16,
    container: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pixels = fs::read(input)?;
    let image = RgbaImage::new(width, height, pixels)?;

    let mut encoder = JpegEncoder::with_quality(quality)?;
    encoder.set_restart_interval(restart_interval);
    let encoded = if container {
        encoder.encode_to_container(&image)?
    } else {
        encoder.encode(&image)?
    };

    fs::write(output, &encoded)?;
    println!(
        "✓ Encoded {}x{} image to {:?} ({} bytes{})",
        width,
        height,
        output,
        encoded.len(),
        if container { ", containerized" } else { "" }
    );
    Ok(())
}

fn decode_image(
    input: &PathBuf,
    output: &PathBuf,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    // Accept both bare streams and containerized ones.
    let decoded = if container::is_container(&data) {
        let unwrapped = container::decode(&data)?;
        JpegDecoder::new(&unwrapped.payload).decode()?
    } else {
        JpegDecoder::new(&data).decode()?
    };

    match format {
        OutputFormat::Raw => {
            fs::write(output, &decoded.pixels)?;
        }
        OutputFormat::Ppm => {
            let mut ppm = format!("P6\n{} {}\n255\n", decoded.width, decoded.height).into_bytes();
            for px in decoded.pixels.chunks_exact(4) {
                ppm.extend_from_slice(&px[..3]);
            }
            fs::write(output, &ppm)?;
        }
    }

    println!(
        "✓ Decoded {}x{} image to {:?}",
        decoded.width, decoded.height, output
    );
    Ok(())
}

fn show_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();

    if container::is_container(&data) {
        let unwrapped = container::decode(&data)?;
        println!("Format: payload container v{}", unwrapped.version);
        println!("  Flags:    {:#04x}", unwrapped.flags);
        println!("  Metadata: {}", unwrapped.metadata);
        println!("  Payload:  {} bytes", unwrapped.payload.len());
        return Ok(());
    }

    println!("Format: JPEG");
    for segment in parse_segments(&data)? {
        match segment {
            Segment::Standalone { marker, offset } => {
                println!("  {:>6}  {:?}", offset, marker);
            }
            Segment::Variable {
                marker,
                offset,
                payload,
            } => {
                println!("  {:>6}  {:?} ({} bytes)", offset, marker, payload.len());
            }
            Segment::Scan { offset, data, .. } => {
                println!("  {:>6}  StartOfScan ({} scan bytes)", offset, data.len());
            }
        }
    }

    let decoded = JpegDecoder::new(&data).decode()?;
    println!();
    println!("  Dimensions: {}x{}", decoded.width, decoded.height);
    if let Some(jfif) = decoded.jfif {
        println!(
            "  JFIF:       v{}.{:02}, density {}x{}",
            jfif.version_major, jfif.version_minor, jfif.x_density, jfif.y_density
        );
    }
    if let Some(spiff) = decoded.spiff {
        println!(
            "  SPIFF:      profile {}, {} components",
            spiff.profile_id, spiff.component_count
        );
    }
    Ok(())
}

fn wrap_payload(
    input: &PathBuf,
    output: &PathBuf,
    metadata: &str,
    flags: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = fs::read(input)?;
    let metadata: serde_json::Value = serde_json::from_str(metadata)?;
    let framed = container::encode(&payload, &metadata, flags)?;
    fs::write(output, &framed)?;
    println!(
        "✓ Wrapped {} payload bytes into {:?} ({} bytes)",
        payload.len(),
        output,
        framed.len()
    );
    Ok(())
}

fn unwrap_payload(input: &PathBuf, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let unwrapped = container::decode(&data)?;
    fs::write(output, &unwrapped.payload)?;
    println!(
        "✓ Unwrapped {} payload bytes to {:?} (flags {:#04x}, metadata {})",
        unwrapped.payload.len(),
        output,
        unwrapped.flags,
        unwrapped.metadata
    );
    Ok(())
}

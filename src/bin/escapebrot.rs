// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use image::{ImageBuffer, Luma};
use log::info;
use num::Complex;

use escapebrot::overlay;
use escapebrot::{
    compute_boundary_map, compute_orbit_density, normalize, quantize, BitDepth, BoundaryConfig,
    Family, OrbitConfig, Polynomial, Raster, Symmetry, ViewBounds,
};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const KIND: &str = "kind";
const OUTPUT: &str = "output";
const WIDTH: &str = "width";
const REAL: &str = "real";
const IMAG: &str = "imag";
const CONSTANT: &str = "constant";
const DEGREE: &str = "degree";
const ITERATIONS: &str = "iterations";
const EXTRA: &str = "extra";
const THRESHOLD: &str = "threshold";
const THREADS: &str = "threads";
const OVERSAMPLE: &str = "oversample";
const SIZE_OFFSET: &str = "size-offset";
const SETTLE: &str = "settle";
const FRACTION: &str = "fraction";
const SEED: &str = "seed";
const PERCENTILE: &str = "percentile";
const DEPTH: &str = "depth";
const BOXES: &str = "boxes";
const NO_SYMMETRY: &str = "no-symmetry";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("escapebrot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Julia, Mandelbrot and Buddhabrot renderer")
        .arg(
            Arg::with_name(KIND)
                .long(KIND)
                .short("k")
                .takes_value(true)
                .possible_values(&["mandelbrot", "julia", "buddhabrot"])
                .default_value("mandelbrot")
                .help("What to render"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (PNG)"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .short("w")
                .takes_value(true)
                .default_value("640")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        20_000,
                        "Could not parse image width",
                        "Image width must be between 1 and 20000",
                    )
                })
                .help("Width of the output image; the height follows from the view"),
        )
        .arg(
            Arg::with_name(REAL)
                .long(REAL)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse real range"))
                .help("Range of the real axis, as low,high"),
        )
        .arg(
            Arg::with_name(IMAG)
                .long(IMAG)
                .short("m")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse imaginary range"))
                .help("Range of the imaginary axis, as low,high"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.8,0.156")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("The constant of a Julia set, as re,im"),
        )
        .arg(
            Arg::with_name(DEGREE)
                .long(DEGREE)
                .short("d")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        16,
                        "Could not parse degree",
                        "Degree must be between 2 and 16",
                    )
                })
                .help("Render z^degree + c"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration limit (default 30, or 2000 for the Buddhabrot)"),
        )
        .arg(
            Arg::with_name(EXTRA)
                .long(EXTRA)
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        100,
                        "Could not parse extra iterations",
                        "Extra iterations must be between 0 and 100",
                    )
                })
                .help("Iterations past escape, for smoother shading"),
        )
        .arg(
            Arg::with_name(THRESHOLD)
                .long(THRESHOLD)
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        f64::MIN_POSITIVE,
                        f64::MAX,
                        "Could not parse escape threshold",
                        "Escape threshold must be positive",
                    )
                })
                .help("Magnitude past which a point has escaped"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(OVERSAMPLE)
                .long(OVERSAMPLE)
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        16,
                        "Could not parse oversample",
                        "Oversample must be between 1 and 16",
                    )
                })
                .help("Sample every pixel oversample x oversample times"),
        )
        .arg(
            Arg::with_name(SIZE_OFFSET)
                .long(SIZE_OFFSET)
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        16,
                        "Could not parse size offset",
                        "Size offset must be between 0 and 16",
                    )
                })
                .help("Start tracing with squares this many halvings smaller"),
        )
        .arg(
            Arg::with_name(SETTLE)
                .long(SETTLE)
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1_000_000,
                        "Could not parse settle threshold",
                        "Settle threshold must be between 0 and 1000000",
                    )
                })
                .help("Buddhabrot: ignore orbits that escape this quickly"),
        )
        .arg(
            Arg::with_name(FRACTION)
                .long(FRACTION)
                .takes_value(true)
                .default_value("0.5")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1000.0,
                        "Could not parse seed fraction",
                        "Seed fraction must be between 0 and 1000",
                    )
                })
                .help("Buddhabrot: seeds to draw, per pixel"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    u64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse random seed".to_string())
                })
                .help("Buddhabrot: seed for the random number generator"),
        )
        .arg(
            Arg::with_name(PERCENTILE)
                .long(PERCENTILE)
                .short("p")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        100.0,
                        "Could not parse percentile",
                        "Percentile must be between 0 and 100",
                    )
                })
                .help("Contrast stretch; 0 scales linearly"),
        )
        .arg(
            Arg::with_name(DEPTH)
                .long(DEPTH)
                .takes_value(true)
                .default_value("16")
                .validator(|s| BitDepth::from_str(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Bits per sample, 8 or 16"),
        )
        .arg(
            Arg::with_name(BOXES)
                .long(BOXES)
                .short("b")
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse box weight",
                        "Box weight must be between 0 and 1",
                    )
                })
                .help("Blend in the squares the tracer refined, with this weight"),
        )
        .arg(
            Arg::with_name(NO_SYMMETRY)
                .long(NO_SYMMETRY)
                .help("Compute the whole view even when it is symmetric"),
        )
        .get_matches()
}

// Values that passed their validators.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    match matches.value_of(name).map(T::from_str) {
        Some(Ok(v)) => v,
        _ => panic!("argument {} was not validated", name),
    }
}

fn threads(matches: &ArgMatches) -> Result<usize, failure::Error> {
    Ok(matches.value_of(THREADS).map_or(Ok(num_cpus::get()), usize::from_str)?)
}

fn bounded(matches: &ArgMatches, bounds: ViewBounds, size: (usize, usize)) -> Result<Raster, failure::Error> {
    let degree: u32 = value(matches, DEGREE);
    let family = match matches.value_of(KIND) {
        Some("julia") => {
            let constant = matches.value_of(CONSTANT).and_then(parse_complex);
            Family::Julia(constant.unwrap_or_else(|| Complex::new(0.0, 0.0)))
        }
        _ => Family::Mandelbrot,
    };
    let symmetry = match family {
        _ if matches.is_present(NO_SYMMETRY) => Symmetry::None,
        Family::Mandelbrot => Symmetry::Conjugate,
        Family::Julia(_) if degree % 2 == 0 => Symmetry::Point,
        Family::Julia(_) => Symmetry::None,
    };
    let map = Polynomial::new(degree);
    let config = BoundaryConfig {
        family,
        max_iterations: matches.value_of(ITERATIONS).map_or(Ok(30), usize::from_str)?,
        extra_iterations: value(matches, EXTRA),
        magnitude_threshold: value(matches, THRESHOLD),
        exponent: map.exponent(),
        workers: threads(matches)?,
        oversample: value(matches, OVERSAMPLE),
        size_offset: value(matches, SIZE_OFFSET),
        symmetry,
        boundary_tracing: true,
        label: Some(match family {
            Family::Julia(c) => format!("julia z^{} + ({} + {}i)", degree, c.re, c.im),
            Family::Mandelbrot => format!("mandelbrot z^{} + c", degree),
        }),
    };

    let result = compute_boundary_map(bounds, size, &map, &config)?;
    let image = normalize(&result.raster, value(matches, PERCENTILE))?;
    let weight: f64 = value(matches, BOXES);
    if weight == 0.0 || result.refined.is_empty() {
        return Ok(image);
    }
    info!("blending {} refined squares", result.refined.len());
    let boxes = overlay::refined_regions(size.0, size.1, &result.refined);
    Ok(overlay::blend(&image, &normalize(&boxes, 0.0)?, weight)?)
}

fn orbits(matches: &ArgMatches, bounds: ViewBounds, size: (usize, usize)) -> Result<Raster, failure::Error> {
    let degree: u32 = value(matches, DEGREE);
    let config = OrbitConfig {
        seed_fraction: value(matches, FRACTION),
        settle_threshold: value(matches, SETTLE),
        max_iterations: matches.value_of(ITERATIONS).map_or(Ok(2000), usize::from_str)?,
        workers: threads(matches)?,
        rng_seed: matches.value_of(SEED).map(u64::from_str).transpose()?,
        sample_bounds: None,
        reject_known_bounded: degree == 2,
        label: Some(format!("buddhabrot z^{} + c", degree)),
    };
    let histogram = compute_orbit_density(bounds, size, &Polynomial::new(degree), &config)?;
    Ok(normalize(&histogram.to_raster(), value(matches, PERCENTILE))?)
}

fn write_image(outfile: &str, image: &Raster, depth: BitDepth) -> Result<(), failure::Error> {
    let (width, height) = (image.width() as u32, image.height() as u32);
    let samples = quantize(image, depth);
    match depth {
        BitDepth::Eight => {
            let bytes: Vec<u8> = samples.into_iter().map(|s| s as u8).collect();
            ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, bytes)
                .ok_or_else(|| failure::err_msg("image buffer has the wrong size"))?
                .save(outfile)?
        }
        BitDepth::Sixteen => ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, samples)
            .ok_or_else(|| failure::err_msg("image buffer has the wrong size"))?
            .save(outfile)?,
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let real = matches.value_of(REAL).and_then(|s| parse_pair::<f64>(s, ','));
    let imag = matches.value_of(IMAG).and_then(|s| parse_pair::<f64>(s, ','));
    let bounds = match (real, imag) {
        (Some(real), Some(imag)) => ViewBounds::new(real, imag)?,
        _ => return Err(failure::err_msg("could not parse the view")),
    };
    let width: usize = value(matches, WIDTH);
    let size = (width, bounds.height_for(width));

    let image = match matches.value_of(KIND) {
        Some("buddhabrot") => orbits(matches, bounds, size)?,
        _ => bounded(matches, bounds, size)?,
    };
    let output = matches.value_of(OUTPUT).unwrap_or("escapebrot.png");
    write_image(output, &image, value(matches, DEPTH))?;
    info!("wrote {}x{} image to {}", size.0, size.1, output);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}

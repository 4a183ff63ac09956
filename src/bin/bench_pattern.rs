use anyhow::{bail, Context, Result};
use quadlife::{get_bounds, load_macrocell, make_center, parse_pattern, NiceInt, Universe};
use std::time::Instant;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: bench_pattern <pattern file> [supersteps] [step log2]");
    };
    let supersteps = match args.next() {
        Some(s) => s.parse::<u32>().context("invalid number of supersteps")?,
        None => 1,
    };
    let step = match args.next() {
        Some(s) => Some(s.parse::<u32>().context("invalid step")?),
        None => None,
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;

    let timer = Instant::now();
    let mut universe = Universe::new();
    if text.starts_with("[M2]") {
        load_macrocell(&mut universe, &text).with_context(|| format!("loading {}", path))?;
    } else {
        let mut pattern = parse_pattern(&text).with_context(|| format!("parsing {}", path))?;
        if let Some(rule) = pattern.rule {
            universe.set_rule(rule);
        }
        let mut bounds = get_bounds(&pattern.field_x, &pattern.field_y);
        make_center(&mut pattern.field_x, &mut pattern.field_y, &mut bounds);
        universe.setup_field(&mut pattern.field_x, &mut pattern.field_y, Some(bounds));
    }
    println!("Time to load pattern: {:?}", timer.elapsed());

    let step = step.unwrap_or_else(|| universe.root_level().saturating_sub(3));
    universe.set_step(step);
    let timer = Instant::now();
    for _ in 0..supersteps {
        universe.next_generation(true);
    }
    println!(
        "Time on {} supersteps of 2^{}: {:?}",
        NiceInt::from(supersteps),
        step,
        timer.elapsed()
    );
    print!("{}", universe.statistics());
    Ok(())
}

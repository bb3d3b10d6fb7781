// Renders a handful of animation frames of one seed to check the pipeline end to end

use flowline::{
    animation::{FrameInterpolator, Gyro, MotionParams},
    art::{GenerationParams, GeometryGenerator},
    render::StaticRenderer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎬 Flowline preview");

    let seed = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()?
        .unwrap_or(42);

    // Step 1: Generation
    println!("\n1. Generating artwork from seed {}...", seed);
    let start = GenerationParams {
        size: 256,
        amount: 50,
        ..GenerationParams::default()
    };
    let generated = GeometryGenerator::new(start)?.generate(Some(seed));
    println!("   Curves: {}", generated.state.amount());
    println!("   Colors: {:?} -> {:?}", generated.state.start_color, generated.state.end_color);

    // Step 2: Static render
    println!("\n2. Rendering still image...");
    let renderer = StaticRenderer::default();
    renderer.render(&generated.state, &start)?.save_png("preview_still.png")?;
    println!("   📁 Saved preview_still.png");

    // Step 3: Animation frames
    println!("\n3. Rendering animation frames...");
    let end = GenerationParams {
        amount: 20,
        line_width: 8,
        ..start
    };
    let interpolator = FrameInterpolator::new(start, end, MotionParams::default());
    for (i, t) in [0.0, 0.25, 0.5, 0.75, 1.0].into_iter().enumerate() {
        let frame = interpolator.interpolate(&generated.state, t, Gyro::default());
        let path = format!("preview_frame_{}.png", i);
        renderer.render(&frame.state, &frame.params)?.save_png(&path)?;
        println!("   t={:.2}: {} curves -> {}", t, frame.params.amount, path);
    }

    // Step 4: Tilt
    println!("\n4. Rendering tilted frame...");
    let tilted = interpolator.interpolate(&generated.state, 0.5, Gyro::new(0.6, -0.4));
    renderer.render(&tilted.state, &tilted.params)?.save_png("preview_tilt.png")?;
    println!("   📁 Saved preview_tilt.png");

    println!("\n🎉 Preview complete.");
    Ok(())
}

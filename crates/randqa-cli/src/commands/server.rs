use super::TuningArgs;

pub fn run(host: &str, port: u16, tuning: &TuningArgs) {
    let defaults = tuning.resolve().unwrap_or_else(|e| super::exit_with(e));
    let base = format!("http://{host}:{port}");

    println!("🔬 randqa server v{}", randqa_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /health           Liveness check");
    println!("     GET /analyze          Sample a source and run the full battery");
    println!();
    println!("   Query params for /analyze:");
    println!(
        "     source=lcg|xorshift|osrandom  bits=1..{}",
        randqa_server::MAX_BITS
    );
    println!("     block_size, ml_k, seed, alpha, rct_cutoff, apt_window");
    println!();
    println!("   Examples:");
    println!("     curl '{base}/analyze?source=lcg&bits=100000&seed=42'");
    println!("     curl '{base}/analyze?source=osrandom&bits=200000'");
    println!();

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| super::exit_with(e));
    if let Err(e) = rt.block_on(randqa_server::run_server(host, port, defaults)) {
        super::exit_with(format!("server on {host}:{port} stopped: {e}"));
    }
}

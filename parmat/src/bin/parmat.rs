use clap::Parser;
use parmat::{Config, Dispatcher, Matrix, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::exit;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, Level};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long)]
    #[clap(help = "JSON config file, individual flags take precedence")]
    config: Option<PathBuf>,

    #[clap(long)]
    #[clap(help = "Number of worker threads, defaults to one less than the available cores")]
    threads: Option<usize>,

    #[clap(long)]
    #[clap(help = "Minimum number of elements per chunk")]
    limit: Option<usize>,

    #[clap(long)]
    #[clap(help = "Floating point comparison tolerance")]
    epsilon: Option<f64>,

    #[clap(long)]
    #[clap(default_value_t = 256)]
    #[clap(help = "Rows and columns of the generated matrices")]
    size: usize,

    #[clap(long)]
    #[clap(default_value_t = Op::Add)]
    #[clap(help = "Operation to run: add, sub, matmul, transpose, pow or symmetric")]
    op: Op,

    #[clap(long)]
    #[clap(help = "Log debug output")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Op {
    Add,
    Sub,
    Matmul,
    Transpose,
    Pow,
    Symmetric,
}

impl std::str::FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "matmul" => Ok(Self::Matmul),
            "transpose" => Ok(Self::Transpose),
            "pow" => Ok(Self::Pow),
            "symmetric" => Ok(Self::Symmetric),
            _ => Err(Self::Err::from("Unsupported operation")),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Matmul => "matmul",
            Self::Transpose => "transpose",
            Self::Pow => "pow",
            Self::Symmetric => "symmetric",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Matrix(Matrix<f64>),
    Flag(bool),
}

fn main() {
    let args = Args::parse();

    // set log collector
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    info!("Application Started: Version {}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Cannot load configuration: {}", err);
            eprintln!("{}", err);
            exit(1);
        }
    };

    match compare(config, args.size, args.op) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(err) => {
            error!("Operation failed: {}", err);
            eprintln!("{}", err);
            exit(1);
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => {
            let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            Config::default().with_threads(cores - 1)
        }
    };

    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(limit) = args.limit {
        config = config.with_limit(limit);
    }
    if let Some(epsilon) = args.epsilon {
        config = config.with_epsilon(epsilon);
    }
    Ok(config.normalized())
}

// run `op` once sequentially and once with `config`, report whether the results agree
fn compare(config: Config, size: usize, op: Op) -> Result<bool> {
    let (a, b) = operands(size, op);

    let sequential = Dispatcher::sequential();
    let parallel = Dispatcher::new(config)?;
    debug!("Partition for {} elements: {:?}", a.len(), parallel.partition(a.len()));

    let (expected, sequential_time) = timed(|| execute(op, &a, &b, &sequential))?;
    let (actual, parallel_time) = timed(|| execute(op, &a, &b, &parallel))?;
    info!(
        "{} on {}x{}: sequential {:?}, {} threads {:?}",
        op, size, size, sequential_time, config.threads, parallel_time
    );

    let identical = expected == actual;
    println!(
        "{} {}x{} threads={} limit={}: {}",
        op,
        size,
        size,
        config.threads,
        config.limit,
        if identical { "identical" } else { "MISMATCH" }
    );
    Ok(identical)
}

fn operands(size: usize, op: Op) -> (Matrix<f64>, Matrix<f64>) {
    let a = Matrix::from_fn(size, size, |row, col| ((row * 31 + col * 17) % 97) as f64 / 97.0);
    let b = Matrix::from_fn(size, size, |row, col| ((row * 13 + col * 41) % 89) as f64 / 89.0);
    if op == Op::Symmetric {
        // a + a^T is symmetric
        let symmetric = Matrix::from_fn(size, size, |row, col| {
            a.as_slice()[row * size + col] + a.as_slice()[col * size + row]
        });
        (symmetric, b)
    } else {
        (a, b)
    }
}

fn execute(op: Op, a: &Matrix<f64>, b: &Matrix<f64>, dispatcher: &Dispatcher) -> Result<Outcome> {
    let outcome = match op {
        Op::Add => Outcome::Matrix(a.add(b, dispatcher)?),
        Op::Sub => Outcome::Matrix(a.sub(b, dispatcher)?),
        Op::Matmul => Outcome::Matrix(a.matmul(b, dispatcher)?),
        Op::Transpose => Outcome::Matrix(a.transpose(dispatcher)?),
        Op::Pow => Outcome::Matrix(a.pow(3, dispatcher)?),
        Op::Symmetric => Outcome::Flag(a.is_symmetric(dispatcher)?),
    };
    Ok(outcome)
}

fn timed<T>(f: impl FnOnce() -> Result<T>) -> Result<(T, Duration)> {
    let start = Instant::now();
    let value = f()?;
    Ok((value, start.elapsed()))
}

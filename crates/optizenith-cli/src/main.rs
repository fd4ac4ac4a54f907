use clap::{Args, Parser, Subcommand, ValueEnum};
use optizenith_solver::{Engine, LpProblem, Solution, Solver, SolverConfig, StandardForm};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "optizenith")]
#[command(about = "Solve linear programs with simplex or interior point", long_about = None)]
struct Cli {
    /// Log at debug level (overrides OPTIZENITH_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem stored as JSON
    Solve {
        /// The problem file
        file: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Validate a problem file and print its dimensions
    Check {
        /// The problem file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SolverArgs {
    /// Algorithm (simplex, interior-point)
    #[arg(short, long, default_value = "simplex")]
    engine: Engine,
    /// Iteration ceiling (defaults to the engine's own)
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Optimality and feasibility tolerance
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
    /// Interior point: largest factor the barrier target may shrink by per iteration
    #[arg(long, default_value_t = 10.0)]
    barrier_reduction: f64,
    /// Interior point: share of the distance to the boundary a step may cover
    #[arg(long, default_value_t = 0.9)]
    fraction_to_boundary: f64,
}

impl SolverArgs {
    fn config(&self) -> SolverConfig {
        let config = SolverConfig::default()
            .with_engine(self.engine)
            .with_tolerance(self.tolerance)
            .with_barrier_reduction(self.barrier_reduction)
            .with_fraction_to_boundary(self.fraction_to_boundary);
        match self.max_iterations {
            Some(max) => config.with_max_iterations(max),
            None => config,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("OPTIZENITH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> LpProblem {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str::<LpProblem>(&source) {
        Ok(problem) => {
            tracing::debug!(
                component = "cli",
                file = %path.display(),
                variables = problem.num_variables(),
                constraints = problem.num_constraints(),
                "Loaded problem"
            );
            problem
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_pretty(problem: &LpProblem, solution: &Solution) {
    if !problem.name.is_empty() {
        println!("Problem: {}", problem.name);
    }
    println!("Engine: {}", solution.engine);
    println!("Status: {}", solution.status.as_str().to_uppercase());
    println!("Iterations: {}", solution.iterations);
    println!("Objective: {}", solution.objective_value);

    if !solution.values.is_empty() {
        println!();
        println!("Variables:");
        for (var, value) in problem.variables.iter().zip(&solution.values) {
            println!("  {:20} {:14.6}", var.name, value);
        }
    }

    if !solution.duals.is_empty() {
        println!();
        println!("Shadow prices:");
        for (i, (c, dual)) in problem.constraints.iter().zip(&solution.duals).enumerate() {
            let label = if c.name.is_empty() {
                format!("#{i}")
            } else {
                c.name.clone()
            };
            println!("  {:20} {:14.6}", label, dual);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            solver,
            format,
        } => {
            let problem = load(&file);
            let config = solver.config();

            let solution = match Solver::with_config(config).solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                OutputFormat::Pretty => print_pretty(&problem, &solution),
            }

            if !solution.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let problem = load(&file);
            match StandardForm::build(&problem) {
                Ok(form) => {
                    println!(
                        "✓ {} variables, {} constraints",
                        problem.num_variables(),
                        problem.num_constraints()
                    );
                    println!(
                        "  standard form: {} rows x {} columns ({} slack, {} artificial)",
                        form.n_rows(),
                        form.n_cols(),
                        form.n_slack,
                        form.n_artificial
                    );
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

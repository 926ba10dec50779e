//! Pension benefit calculator CLI
//!
//! `calc` estimates the benefit for one member, `batch` runs a CSV of members.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use pension_benefit::batch::{load_members, write_results};
use pension_benefit::{
    Assumptions, BatchRunner, BenefitCalculator, BenefitInputs, DataPaths, Gender, PlanConfig,
};

const MAX_YEARS_OF_SERVICE: u32 = 70;
const MIN_SALARY: f64 = 10_000.0;
const MAX_SALARY: f64 = 500_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGender {
    Female,
    Male,
}

impl From<CliGender> for Gender {
    fn from(value: CliGender) -> Self {
        match value {
            CliGender::Female => Gender::Female,
            CliGender::Male => Gender::Male,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

#[derive(Parser, Debug)]
#[command(
    name = "pension-calc",
    about = "Estimate a deferred pension benefit from age, service and salary"
)]
struct Cli {
    #[arg(long, global = true, help = "Plan configuration JSON file")]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Directory holding deferred_factors.csv and salary_increase_rate.csv"
    )]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benefit estimate for a single member
    Calc {
        #[arg(long, default_value_t = 30)]
        age: u32,
        #[arg(long, default_value_t = 5)]
        years_of_service: u32,
        #[arg(long, default_value_t = MIN_SALARY)]
        salary: f64,
        #[arg(long, value_enum, default_value_t = YesNo::Yes)]
        teacher: YesNo,
        #[arg(long, value_enum, default_value_t = CliGender::Female)]
        gender: CliGender,
        #[arg(long, help = "Address to send results to (not yet supported)")]
        email: Option<String>,
        #[arg(long, help = "Print results as JSON")]
        json: bool,
    },
    /// Benefit estimates for every member in a CSV file
    Batch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, help = "Output CSV path; stdout when omitted")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut plan = match &cli.config {
        Some(path) => PlanConfig::from_json_file(path)?,
        None => PlanConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        plan.data = DataPaths::in_dir(dir);
    }

    let assumptions = Assumptions::load(&plan.data).context("Failed to load reference tables")?;
    let calculator = BenefitCalculator::new(assumptions, plan.benefit);

    match cli.command {
        Command::Calc {
            age,
            years_of_service,
            salary,
            teacher,
            gender,
            email,
            json,
        } => {
            if years_of_service > MAX_YEARS_OF_SERVICE {
                bail!("years of service must be between 0 and {MAX_YEARS_OF_SERVICE}");
            }
            if !(MIN_SALARY..=MAX_SALARY).contains(&salary) {
                bail!("salary must be between {MIN_SALARY} and {MAX_SALARY}");
            }

            let inputs = BenefitInputs {
                age,
                years_of_service,
                salary,
                is_teacher: teacher == YesNo::Yes,
                gender: gender.into(),
            };
            let result = calculator
                .compute(&inputs)
                .with_context(|| format!("Benefit calculation failed for {inputs:?}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Results");
                println!("=======");
                print!("{result}");
            }

            if let Some(address) = email {
                warn!("Email delivery is not supported; results not sent to {address}");
            }
        }
        Command::Batch { input, output } => {
            let members = load_members(&input)
                .with_context(|| format!("Failed to read members from {}", input.display()))?;
            info!("Loaded {} members from {}", members.len(), input.display());

            let outcomes = BatchRunner::new(calculator).run(&members);

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Unable to create {}", path.display()))?;
                    write_results(file, &outcomes)?;
                    println!("Results written to: {}", path.display());
                }
                None => write_results(io::stdout().lock(), &outcomes)?,
            }
        }
    }

    Ok(())
}

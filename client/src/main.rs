use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mr_common::{JobInfo, JobRequest, JobResults, WorkerInfo};
use reqwest::Client;
use std::env;

/// Same variable as the worker; defaults to a master on this machine.
fn master_base_url() -> String {
    env::var("MASTER_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string())
        .trim_end_matches('/')
        .to_string()
}

#[derive(Parser)]
#[command(name = "mr-client")]
#[command(about = "Submit MapReduce jobs and inspect them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submits a job: one map task per file matching INPUT_GLOB
    Submit {
        #[arg(value_name = "NAME")]
        name: String,

        /// Pattern as seen by the master, e.g. "/data/mr/input/*.txt"
        #[arg(value_name = "INPUT_GLOB")]
        input_glob: String,

        #[arg(long, default_value_t = 3)]
        n_reduce: u32,
    },
    /// Shows the state of a job
    Status {
        #[arg(value_name = "JOB_ID")]
        id: String,
    },
    /// Lists the output files of a job
    Results {
        #[arg(value_name = "JOB_ID")]
        id: String,
    },
    /// Lists registered workers
    Workers,
}

fn print_job(job: &JobInfo) {
    println!("Job:");
    println!("  id: {}", job.id);
    println!("  name: {}", job.name);
    println!("  status: {:?}", job.status);
    if let Some(phase) = job.phase {
        println!("  phase: {}", phase);
    }
    println!("  map tasks: {}", job.n_map());
    println!("  reduce tasks: {}", job.n_reduce);
    println!("  submitted_at: {}", job.submitted_at);
    if let Some(ref started) = job.started_at {
        println!("  started_at: {}", started);
    }
    if let Some(ref done) = job.finished_at {
        println!("  finished_at: {}", done);
    }
    if let Some(ref out) = job.output_file {
        println!("  output: {}", out);
    }
    if let Some(ref err) = job.error {
        println!("  error: {}", err);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = master_base_url();

    match cli.command {
        Commands::Submit {
            name,
            input_glob,
            n_reduce,
        } => {
            let url = format!("{}/api/v1/jobs", base_url);
            let req = JobRequest {
                name,
                input_glob,
                n_reduce,
            };
            let resp = client
                .post(&url)
                .json(&req)
                .send()
                .await
                .with_context(|| format!("contacting master at {}", base_url))?;

            if resp.status().is_success() {
                let job: JobInfo = resp.json().await?;
                println!("Job submitted.");
                print_job(&job);
            } else {
                let status = resp.status();
                let reason = resp.text().await.unwrap_or_default();
                println!("Job rejected (status {}): {}", status, reason);
            }
        }

        Commands::Status { id } => {
            let url = format!("{}/api/v1/jobs/{}", base_url, id);
            let resp = client.get(&url).send().await?;
            if resp.status().is_success() {
                let job: JobInfo = resp.json().await?;
                print_job(&job);
            } else {
                println!("Job {} not found (status {})", id, resp.status());
            }
        }

        Commands::Results { id } => {
            let url = format!("{}/api/v1/jobs/{id}/results", base_url);
            let resp = client.get(&url).send().await?;

            if resp.status().is_success() {
                let results: JobResults = resp.json().await?;
                println!("Results for job {}:", results.job_id);
                match results.output_file {
                    Some(out) => println!("  merged output: {}", out),
                    None => println!("  merged output: (not ready)"),
                }
                if !results.files.is_empty() {
                    println!("  reduce outputs:");
                    for f in results.files {
                        println!("    - {}", f);
                    }
                }
            } else {
                println!("No results for job {id}");
            }
        }

        Commands::Workers => {
            let url = format!("{}/api/v1/workers", base_url);
            let resp = client.get(&url).send().await?;
            if resp.status().is_success() {
                let workers: Vec<WorkerInfo> = resp.json().await?;
                if workers.is_empty() {
                    println!("No workers registered.");
                } else {
                    println!("{}", serde_json::to_string_pretty(&workers)?);
                }
            } else {
                println!("Error querying /api/v1/workers (status {})", resp.status());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn submit_takes_reduce_count() {
        let cli = Cli::try_parse_from(["mr-client", "submit", "wc", "/in/*.txt", "--n-reduce", "5"]).unwrap();
        match cli.command {
            Commands::Submit { name, input_glob, n_reduce } => {
                assert_eq!(name, "wc");
                assert_eq!(input_glob, "/in/*.txt");
                assert_eq!(n_reduce, 5);
            }
            _ => panic!("expected submit"),
        }
    }
}

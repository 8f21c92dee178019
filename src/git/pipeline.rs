use crate::error::GitResult;
use crate::git::executor::{CommandOutput, CommandRunner};
use tokio_util::sync::CancellationToken;

/// What happens to the rest of a pipeline when a step exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Run the next step anyway
    Continue,
    /// Skip every remaining step
    Abort,
}

/// One git invocation inside a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub args: Vec<String>,
    pub on_failure: FailurePolicy,
}

impl Step {
    /// Create a step that lets the pipeline continue on failure
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            on_failure: FailurePolicy::Continue,
        }
    }

    /// Stop the pipeline if this step fails
    pub fn abort_on_failure(mut self) -> Self {
        self.on_failure = FailurePolicy::Abort;
        self
    }

    /// Render the step as a copy-pasteable command line
    pub fn command_line(&self) -> String {
        let mut line = String::from("git");
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
                line.push_str(&format!("{:?}", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// An ordered list of git steps making up one user-facing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Argument vectors of every step, in order
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.steps.iter().map(|s| s.args.clone()).collect()
    }
}

/// The captured result of one executed step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub command: String,
    pub output: CommandOutput,
}

/// Everything that happened while running a pipeline
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub name: String,
    pub outcomes: Vec<StepOutcome>,
    /// Index of the step whose failure stopped the pipeline
    pub aborted_at: Option<usize>,
    /// Steps that never ran because of an abort
    pub skipped: Vec<String>,
}

impl PipelineReport {
    /// True when every step ran and exited zero
    pub fn succeeded(&self) -> bool {
        self.aborted_at.is_none() && self.outcomes.iter().all(|o| o.output.success)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.output.success)
    }

    /// Concatenated stdout of every executed step
    pub fn combined_stdout(&self) -> String {
        self.outcomes
            .iter()
            .map(|o| o.output.stdout.as_str())
            .collect::<Vec<_>>()
            .concat()
    }

    /// Stdout of the last executed step
    pub fn last_stdout(&self) -> &str {
        self.outcomes
            .last()
            .map(|o| o.output.stdout.as_str())
            .unwrap_or("")
    }
}

/// Run every step of `pipeline` in order, honouring each step's failure policy
pub async fn run_pipeline(
    runner: &dyn CommandRunner,
    pipeline: &Pipeline,
    cancel: &CancellationToken,
) -> GitResult<PipelineReport> {
    log::info!("running {} ({} steps)", pipeline.name, pipeline.len());

    let mut outcomes = Vec::with_capacity(pipeline.len());
    let mut aborted_at = None;

    for (index, step) in pipeline.steps.iter().enumerate() {
        let output = runner.run(&step.args, cancel).await?;
        let failed = !output.success;

        if failed {
            log::warn!(
                "{}: '{}' exited with {}",
                pipeline.name,
                step.command_line(),
                output.exit_code
            );
        }

        outcomes.push(StepOutcome {
            command: step.command_line(),
            output,
        });

        if failed && step.on_failure == FailurePolicy::Abort {
            aborted_at = Some(index);
            break;
        }
    }

    let skipped = pipeline.steps[outcomes.len()..]
        .iter()
        .map(Step::command_line)
        .collect();

    Ok(PipelineReport {
        name: pipeline.name.clone(),
        outcomes,
        aborted_at,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails any step whose first argument is listed in `failing`
    struct ScriptedRunner {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, args: &[String], _cancel: &CancellationToken) -> GitResult<CommandOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            let fail = self.failing.contains(&args[0].as_str());
            Ok(CommandOutput {
                stdout: format!("{}\n", args.join(" ")),
                stderr: if fail { "boom".to_string() } else { String::new() },
                exit_code: if fail { 1 } else { 0 },
                success: !fail,
            })
        }
    }

    fn three_steps(middle: Step) -> Pipeline {
        Pipeline::new("test")
            .then(Step::new(["first"]))
            .then(middle)
            .then(Step::new(["third"]))
    }

    #[tokio::test]
    async fn test_continue_policy_runs_remaining_steps() {
        let runner = ScriptedRunner::new(vec!["second"]);
        let pipeline = three_steps(Step::new(["second"]));

        let report = run_pipeline(&runner, &pipeline, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(runner.calls.lock().unwrap().len(), 3);
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.aborted_at.is_none());
        assert!(report.skipped.is_empty());
        assert!(!report.succeeded());
        assert_eq!(report.failed_steps().count(), 1);
    }

    #[tokio::test]
    async fn test_abort_policy_skips_remaining_steps() {
        let runner = ScriptedRunner::new(vec!["second"]);
        let pipeline = three_steps(Step::new(["second"]).abort_on_failure());

        let report = run_pipeline(&runner, &pipeline, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(runner.calls.lock().unwrap().len(), 2);
        assert_eq!(report.aborted_at, Some(1));
        assert_eq!(report.skipped, vec!["git third".to_string()]);
        assert!(!report.succeeded());
    }

    #[tokio::test]
    async fn test_abort_policy_ignored_on_success() {
        let runner = ScriptedRunner::new(vec![]);
        let pipeline = three_steps(Step::new(["second"]).abort_on_failure());

        let report = run_pipeline(&runner, &pipeline, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(report.combined_stdout(), "first\nsecond\nthird\n");
        assert_eq!(report.last_stdout(), "third\n");
    }

    #[test]
    fn test_command_line_quotes_whitespace() {
        let step = Step::new(["commit", "-m", "fix the thing", "-m", ""]);
        assert_eq!(step.command_line(), "git commit -m \"fix the thing\" -m \"\"");
    }

    #[test]
    fn test_step_defaults_to_continue() {
        assert_eq!(Step::new(["status"]).on_failure, FailurePolicy::Continue);
        assert_eq!(
            Step::new(["status"]).abort_on_failure().on_failure,
            FailurePolicy::Abort
        );
    }
}

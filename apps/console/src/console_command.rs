use atelier_core::{AppError, AppResult};
use atelier_domain::{Channel, TemplateStatus, WorkflowStatus, WorkflowTriggerType};

pub const HELP: &str = "\
Commandes :
  show                          réaffiche la page
  detail <code> | close         ouvre ou ferme le détail d'un workflow
  trigger <code>                déclenche manuellement un workflow
  status <statut>               ajoute ou retire un statut du brouillon de filtres
  trigger-type <type>           ajoute ou retire un déclencheur du brouillon de filtres
  search [texte]                recherche du brouillon de filtres
  apply | reset                 applique ou réinitialise les filtres
  dismiss | retry               ferme le bandeau d'erreur ou relance le chargement
  expand <canal>                ouvre ou ferme un groupe de templates
  channel <canal|all>           filtre les templates par canal
  template-status <statut|all>  filtre les templates par statut
  find [texte]                  recherche de templates
  template <id> | close-template
  activate <id> | delete <id>   active ou supprime un template
  help | quit";

/// One console interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show,
    Detail(String),
    CloseDetail,
    Trigger(String),
    ToggleStatus(WorkflowStatus),
    ToggleTriggerType(WorkflowTriggerType),
    Search(String),
    Apply,
    Reset,
    Dismiss,
    Retry,
    Expand(Channel),
    TemplateChannelFilter(Option<Channel>),
    TemplateStatusFilter(Option<TemplateStatus>),
    FindTemplates(String),
    OpenTemplate(String),
    CloseTemplate,
    Activate(String),
    Delete(String),
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses whitespace-separated words, as typed on one line or passed as arguments.
    pub fn parse<S: AsRef<str>>(words: &[S]) -> AppResult<Self> {
        let Some((command, arguments)) = words.split_first() else {
            return Ok(Self::Show);
        };
        let arguments = arguments
            .iter()
            .map(|argument| argument.as_ref())
            .collect::<Vec<_>>();
        let rest = arguments.join(" ");

        match command.as_ref() {
            "show" => Ok(Self::Show),
            "detail" => Ok(Self::Detail(single(&arguments, "detail")?)),
            "close" => Ok(Self::CloseDetail),
            "trigger" => Ok(Self::Trigger(single(&arguments, "trigger")?)),
            "status" => {
                WorkflowStatus::parse(single(&arguments, "status")?.as_str()).map(Self::ToggleStatus)
            }
            "trigger-type" => WorkflowTriggerType::parse(single(&arguments, "trigger-type")?.as_str())
                .map(Self::ToggleTriggerType),
            "search" => Ok(Self::Search(rest)),
            "apply" => Ok(Self::Apply),
            "reset" => Ok(Self::Reset),
            "dismiss" => Ok(Self::Dismiss),
            "retry" => Ok(Self::Retry),
            "expand" => Channel::parse(single(&arguments, "expand")?.as_str()).map(Self::Expand),
            "channel" => {
                let value = single(&arguments, "channel")?;
                if value == "all" {
                    return Ok(Self::TemplateChannelFilter(None));
                }
                Channel::parse(value.as_str()).map(|channel| Self::TemplateChannelFilter(Some(channel)))
            }
            "template-status" => {
                let value = single(&arguments, "template-status")?;
                if value == "all" {
                    return Ok(Self::TemplateStatusFilter(None));
                }
                TemplateStatus::parse(value.as_str())
                    .map(|status| Self::TemplateStatusFilter(Some(status)))
            }
            "find" => Ok(Self::FindTemplates(rest)),
            "template" => Ok(Self::OpenTemplate(single(&arguments, "template")?)),
            "close-template" => Ok(Self::CloseTemplate),
            "activate" => Ok(Self::Activate(single(&arguments, "activate")?)),
            "delete" => Ok(Self::Delete(single(&arguments, "delete")?)),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(AppError::Validation(format!(
                "unknown command '{other}', type 'help'"
            ))),
        }
    }
}

fn single(arguments: &[&str], command: &str) -> AppResult<String> {
    match arguments {
        [value] => Ok((*value).to_owned()),
        _ => Err(AppError::Validation(format!(
            "'{command}' expects exactly one argument"
        ))),
    }
}

//! Terminal view layer: renders store state as tables and dispatches
//! intents (login, submit, approve, filter, ...) back into the stores.

use std::io::Write as _;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use outlay::models::{
    Expense, ExpenseFilters, RegisterRequest, UpdateExpenseStatus, User,
};
use outlay::persist::FileStorage;
use outlay::validation::{parse_expense_form, ValidationErrors};
use outlay::{AuthToken, ExpenseApi, ExpenseStore, HttpApi, SessionStore};

type Session = SessionStore<HttpApi, FileStorage>;
type Expenses = ExpenseStore<HttpApi>;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let token = Arc::new(AuthToken::default());
    let api = Arc::new(HttpApi::from_env(token.clone()).expect("Failed to build HTTP client"));
    println!("outlay expense client, backend {}", api.base_url());

    let mut session = Session::new(api.clone(), FileStorage::from_env(), token);
    let mut expenses = Expenses::new(api.clone());

    if session.restore() {
        if let Some(user) = session.user() {
            println!("Welcome back, {} ({})", user.full_name(), user.role.as_str());
        }
    } else {
        println!("Not signed in. Try `login <email> <password>` or `help`.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("outlay> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            _ => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "login" => login(&mut session, &args).await,
            "register" => register(&mut session, &args).await,
            "logout" => {
                session.logout();
                println!("Signed out.");
            }
            "whoami" => whoami(&session),
            "list" => {
                if require_auth(&session) {
                    list_expenses(&mut expenses).await;
                }
            }
            "show" => {
                if require_auth(&session) {
                    show_expense(api.as_ref(), &args).await;
                }
            }
            "filter" => {
                if require_auth(&session) {
                    apply_filter(&mut expenses, &args).await;
                }
            }
            "submit" => {
                if require_auth(&session) {
                    submit(&mut expenses, &args).await;
                }
            }
            "pending" => {
                if admin_or_redirect(&session, &mut expenses).await {
                    show_pending(&mut expenses).await;
                }
            }
            "approve" => {
                if admin_or_redirect(&session, &mut expenses).await {
                    decide(&mut expenses, &args, true).await;
                }
            }
            "reject" => {
                if admin_or_redirect(&session, &mut expenses).await {
                    decide(&mut expenses, &args, false).await;
                }
            }
            "analytics" => {
                if require_auth(&session) {
                    show_analytics(&mut expenses).await;
                }
            }
            "employees" => {
                if admin_or_redirect(&session, &mut expenses).await {
                    show_employees(api.as_ref()).await;
                }
            }
            other => println!("Unknown command `{}`; try `help`.", other),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login <email> <password>");
    println!("  register <email> <password> <first> <last>");
    println!("  logout | whoami");
    println!("  list                         show your expenses");
    println!("  show <id>                    one expense in full");
    println!("  filter [category=..] [status=..] [from=YYYY-MM-DD] [to=YYYY-MM-DD]");
    println!("  filter clear");
    println!("  submit <amount> <category> <date> <description...>");
    println!("  analytics                    aggregate summary");
    println!("  pending | approve <id> | reject <id> <reason...>   (admin)");
    println!("  employees                                          (admin)");
    println!("  quit");
}

fn require_auth(session: &Session) -> bool {
    if session.is_authenticated() {
        true
    } else {
        println!("Sign in first: `login <email> <password>`.");
        false
    }
}

/// Admin-only views redirect back to the caller's own expense list
/// instead of rendering a permission error.
async fn admin_or_redirect(session: &Session, expenses: &mut Expenses) -> bool {
    if !require_auth(session) {
        return false;
    }
    if session.is_admin() {
        true
    } else {
        println!("That view is admin-only; showing your expenses instead.");
        list_expenses(expenses).await;
        false
    }
}

fn print_field_errors(errors: &ValidationErrors) {
    for error in &errors.0 {
        println!("  {}", error);
    }
}

fn print_store_error(expenses: &Expenses) -> bool {
    if let Some(error) = expenses.error() {
        println!("error: {}", error);
        true
    } else {
        false
    }
}

async fn login(session: &mut Session, args: &[&str]) {
    let (email, password) = match args {
        [email, password] => (*email, *password),
        _ => {
            println!("Usage: login <email> <password>");
            return;
        }
    };
    if let Err(errors) = session.login(email, password).await {
        print_field_errors(&errors);
        return;
    }
    match session.error() {
        Some(error) => println!("error: {}", error),
        None => {
            if let Some(user) = session.user() {
                println!("Signed in as {} ({})", user.full_name(), user.role.as_str());
            }
        }
    }
}

async fn register(session: &mut Session, args: &[&str]) {
    let request = match args {
        [email, password, first, last] => RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role: None,
        },
        _ => {
            println!("Usage: register <email> <password> <first> <last>");
            return;
        }
    };
    if let Err(errors) = session.register(request).await {
        print_field_errors(&errors);
        return;
    }
    match session.error() {
        Some(error) => println!("error: {}", error),
        None => println!("Account created; you are signed in."),
    }
}

fn whoami(session: &Session) {
    match session.user() {
        Some(user) => println!(
            "{} <{}> ({})",
            user.full_name(),
            user.email,
            user.role.as_str()
        ),
        None => println!("Not signed in."),
    }
}

async fn list_expenses(expenses: &mut Expenses) {
    expenses.fetch_expenses().await;
    if print_store_error(expenses) {
        return;
    }
    if !expenses.filters().is_empty() {
        let pairs: Vec<String> = expenses
            .filters()
            .to_query()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!("Active filters: {}", pairs.join(" "));
    }
    print_expense_table(expenses.expenses());
}

async fn apply_filter(expenses: &mut Expenses, args: &[&str]) {
    if matches!(args, ["clear"]) {
        expenses.set_filters(ExpenseFilters::default());
        list_expenses(expenses).await;
        return;
    }

    let mut filters = ExpenseFilters::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            println!("Expected key=value, got `{}`.", arg);
            return;
        };
        let parsed = match key {
            "category" => value.parse().map(|c| filters.category = Some(c)),
            "status" => value.parse().map(|s| filters.status = Some(s)),
            "from" => parse_date(value).map(|d| filters.start_date = Some(d)),
            "to" => parse_date(value).map(|d| filters.end_date = Some(d)),
            other => {
                println!("Unknown filter `{}`.", other);
                return;
            }
        };
        if let Err(message) = parsed {
            println!("{}", message);
            return;
        }
    }
    expenses.set_filters(filters);
    list_expenses(expenses).await;
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("`{}` is not a YYYY-MM-DD date", value))
}

async fn submit(expenses: &mut Expenses, args: &[&str]) {
    let (amount, category, date, description) = match args {
        [amount, category, date, description @ ..] if !description.is_empty() => {
            (*amount, *category, *date, description.join(" "))
        }
        _ => {
            println!("Usage: submit <amount> <category> <date> <description...>");
            return;
        }
    };
    let request = match parse_expense_form(amount, category, date, &description) {
        Ok(request) => request,
        Err(errors) => {
            print_field_errors(&errors);
            return;
        }
    };
    if let Err(errors) = expenses.create_expense(request).await {
        print_field_errors(&errors);
        return;
    }
    if !print_store_error(expenses) {
        println!("Submitted; awaiting approval.");
        print_expense_table(expenses.expenses());
    }
}

async fn show_expense(api: &HttpApi, args: &[&str]) {
    let id = match args {
        [id] => match Uuid::parse_str(id) {
            Ok(id) => id,
            Err(_) => {
                println!("`{}` is not an expense id.", id);
                return;
            }
        },
        _ => {
            println!("Usage: show <id>");
            return;
        }
    };
    match api.get_expense(id).await {
        Ok(expense) => {
            print_expense_table(std::slice::from_ref(&expense));
            println!(
                "submitted by {} <{}> on {}",
                expense.user.full_name(),
                expense.user.email,
                expense.created_at.format("%Y-%m-%d %H:%M")
            );
            if let Some(at) = expense.approved_at {
                println!("decided at {}", at.format("%Y-%m-%d %H:%M"));
            }
        }
        Err(err) => println!("error: {}", err.message_or("Failed to fetch expense")),
    }
}

async fn show_pending(expenses: &mut Expenses) {
    expenses.fetch_pending_expenses().await;
    if !print_store_error(expenses) {
        println!("Pending approvals:");
        print_expense_table(expenses.pending_expenses());
    }
}

async fn decide(expenses: &mut Expenses, args: &[&str], approve: bool) {
    let (id, update) = match (approve, args) {
        (true, [id]) => (*id, UpdateExpenseStatus::approve()),
        (false, [id, reason @ ..]) if !reason.is_empty() => {
            (*id, UpdateExpenseStatus::reject(reason.join(" ")))
        }
        (true, _) => {
            println!("Usage: approve <id>");
            return;
        }
        (false, _) => {
            println!("Usage: reject <id> <reason...>");
            return;
        }
    };
    let id = match Uuid::parse_str(id) {
        Ok(id) => id,
        Err(_) => {
            println!("`{}` is not an expense id.", id);
            return;
        }
    };
    if let Err(errors) = expenses.update_expense_status(id, update).await {
        print_field_errors(&errors);
        return;
    }
    if !print_store_error(expenses) {
        println!("Done.");
        show_pending(expenses).await;
    }
}

async fn show_analytics(expenses: &mut Expenses) {
    expenses.fetch_analytics().await;
    if print_store_error(expenses) {
        return;
    }
    let Some(analytics) = expenses.analytics() else {
        println!("No analytics available.");
        return;
    };
    println!(
        "{} expenses totaling {}",
        analytics.total_expenses,
        analytics.total_amount.round_dp(2)
    );
    println!(
        "pending {}  approved {}  rejected {}",
        analytics.status_counts.pending,
        analytics.status_counts.approved,
        analytics.status_counts.rejected
    );
    let breakdown = expenses.category_breakdown(5);
    if !breakdown.is_empty() {
        println!("Top categories:");
        for share in breakdown {
            let bar = "#".repeat((share.share_of_max / 5.0).round() as usize);
            println!("  {:<16} {:>10} {}", share.category, share.amount.round_dp(2), bar);
        }
    }
}

async fn show_employees(api: &HttpApi) {
    match api.list_users().await {
        Ok(users) => print_user_table(&users),
        Err(err) => println!("error: {}", err.message_or("Failed to fetch employees")),
    }
}

fn print_expense_table(expenses: &[Expense]) {
    if expenses.is_empty() {
        println!("(no expenses)");
        return;
    }
    println!(
        "{:<36} {:<10} {:<16} {:>10} {:<9} {}",
        "id", "date", "category", "amount", "status", "description"
    );
    for expense in expenses {
        println!(
            "{:<36} {:<10} {:<16} {:>10} {:<9} {}",
            expense.id,
            expense.expense_date,
            expense.category,
            expense.amount.round_dp(2),
            expense.status,
            expense.description
        );
        if let Some(reason) = &expense.rejection_reason {
            println!("{:<36} rejected: {}", "", reason);
        }
    }
}

fn print_user_table(users: &[User]) {
    if users.is_empty() {
        println!("(no users)");
        return;
    }
    println!("{:<36} {:<28} {:<20} {:<8} active", "id", "email", "name", "role");
    for user in users {
        println!(
            "{:<36} {:<28} {:<20} {:<8} {}",
            user.id,
            user.email,
            user.full_name(),
            user.role.as_str(),
            user.is_active
        );
    }
}

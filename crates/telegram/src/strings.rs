//! User-facing replies (Russian UI).

use {relay_common::Role, relay_projects::Project};

pub const ADMIN_ONLY: &str = "Эта команда доступна только администратору.";
pub const START: &str = "Бот-посредник активен. Используйте /project_info чтобы узнать привязку чата.";
pub const CHAT_NOT_BOUND: &str = "Этот чат не привязан ни к одному проекту.";
pub const NO_PROJECTS: &str = "Проекты отсутствуют.";
pub const INTERNAL_ERROR: &str = "Внутренняя ошибка. Попробуйте позже.";

pub fn usage(command: &str) -> String {
    format!("Использование: /{command} <slug>")
}

pub fn project_created(slug: &str) -> String {
    format!(
        "Проект {slug} создан. Теперь зайдите в чат с заказчиками и выполните /bind_customer {slug}."
    )
}

pub fn customer_bound(slug: &str) -> String {
    format!("Проект {slug}: чат заказчика успешно привязан.")
}

pub fn unlinked(project: &Project) -> String {
    format!(
        "Проект {}: чат отвязан или проект деактивирован. Активен: {}.",
        project.slug,
        yes_no(project.is_active)
    )
}

pub fn already_exists(slug: &str) -> String {
    format!("Проект {slug} уже существует")
}

pub fn not_found(slug: &str) -> String {
    format!("Проект {slug} не найден")
}

pub fn project_info(project: &Project, role: Role) -> String {
    let chat_type = match role {
        Role::Executor => "чат исполнителей",
        Role::Customer => "чат заказчиков",
    };
    format!(
        "Проект: {}\nТип чата: {chat_type}\nСтатус: {}",
        project.slug,
        active(project.is_active)
    )
}

/// One line of `/list_projects`.
pub fn project_line(project: &Project) -> String {
    format!(
        "{}: заказчик {}, исполнитель {}, статус {}",
        project.slug,
        bound(project.customer_chat_id.is_some()),
        bound(project.executor_chat_id.is_some()),
        active(project.is_active)
    )
}

fn bound(is_bound: bool) -> &'static str {
    if is_bound {
        "привязан"
    } else {
        "не привязан"
    }
}

fn active(is_active: bool) -> &'static str {
    if is_active {
        "активен"
    } else {
        "неактивен"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "да" } else { "нет" }
}

use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub technologies: &'static [&'static str],
    pub features: &'static [&'static str],
    pub challenges: &'static str,
    pub results: &'static str,
    pub live_url: &'static str,
    pub source_url: &'static str,
}

pub const PROJECTS: [ProjectRecord; 3] = [
    ProjectRecord {
        id: 1,
        title: "Full-Stack E-commerce",
        description: "E-commerce platform built with React and Node.js, with a shopping cart, payment processing and an admin dashboard.",
        image: "images/project1-detail.jpg",
        technologies: &["React", "Node.js", "MongoDB", "Stripe", "JWT", "Socket.io"],
        features: &[
            "Secure JWT authentication",
            "Real-time shopping cart",
            "Integrated payment flow",
            "Complete admin dashboard",
            "Push notifications",
            "Product reviews and ratings",
        ],
        challenges: "Keeping a shopper's cart in sync in real time across every device they are signed in on.",
        results: "Sales conversion up 40% and checkout time down 60%.",
        live_url: "https://exemplo-ecommerce.com",
        source_url: "https://github.com/usuario/ecommerce",
    },
    ProjectRecord {
        id: 2,
        title: "Analytics Dashboard",
        description: "Interactive business analytics dashboard with live charts and real-time reports.",
        image: "images/project2-detail.jpg",
        technologies: &["Vue.js", "Laravel", "MySQL", "Chart.js", "Redis", "Docker"],
        features: &[
            "Interactive real-time charts",
            "Advanced filtering",
            "PDF report export",
            "Automatic alerts",
            "Responsive layout",
            "Smart caching",
        ],
        challenges: "Handling large data volumes without degrading the experience for people using the dashboard.",
        results: "Report generation time down 70% and team productivity up 50%.",
        live_url: "https://exemplo-dashboard.com",
        source_url: "https://github.com/usuario/dashboard",
    },
    ProjectRecord {
        id: 3,
        title: "Task Management App",
        description: "Project and task management app with collaboration features and calendar integration.",
        image: "images/project3-detail.jpg",
        technologies: &["Angular", "Express", "PostgreSQL", "TypeScript", "WebRTC", "PWA"],
        features: &[
            "Project and task management",
            "Real-time collaboration",
            "Calendar integration",
            "Push notifications",
            "Offline mode (PWA)",
            "Threaded comments",
        ],
        challenges: "Real-time collaboration with efficient synchronisation between many simultaneous users.",
        results: "Team organisation improved by 85% and on-time project delivery up 45%.",
        live_url: "https://exemplo-tasks.com",
        source_url: "https://github.com/usuario/task-manager",
    },
];

pub fn find_project(id: u32) -> Option<&'static ProjectRecord> {
    PROJECTS.iter().find(|project| project.id == id)
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_project_detail(project: &ProjectRecord) -> String {
    let title = escape_html(project.title);
    let mut html = String::new();

    let _ = write!(
        html,
        concat!(
            "<div class=\"project-detail\">",
            "<div class=\"project-detail-header\">",
            "<img src=\"{image}\" alt=\"{title}\" class=\"project-detail-image\">",
            "<div class=\"project-detail-info\">",
            "<h2 class=\"project-detail-title\">{title}</h2>",
            "<p class=\"project-detail-description\">{description}</p>",
            "<div class=\"project-detail-links\">",
            "<a href=\"{live}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"btn btn-primary\">",
            "<i class=\"fas fa-external-link-alt\"></i> Live site</a>",
            "<a href=\"{source}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"btn btn-secondary\">",
            "<i class=\"fab fa-github\"></i> Source</a>",
            "</div></div></div>",
        ),
        image = escape_html(project.image),
        title = title,
        description = escape_html(project.description),
        live = escape_html(project.live_url),
        source = escape_html(project.source_url),
    );

    html.push_str("<div class=\"project-detail-content\">");

    html.push_str("<div class=\"detail-section\"><h3>Technologies</h3><div class=\"tech-tags\">");
    for technology in project.technologies {
        let _ = write!(html, "<span class=\"tech-tag\">{}</span>", escape_html(technology));
    }
    html.push_str("</div></div>");

    html.push_str("<div class=\"detail-section\"><h3>Key features</h3>");
    html.push_str("<ul class=\"features-list\">");
    for feature in project.features {
        let _ = write!(html, "<li>{}</li>", escape_html(feature));
    }
    html.push_str("</ul></div>");

    let _ = write!(
        html,
        "<div class=\"detail-section\"><h3>Technical challenges</h3><p>{}</p></div>",
        escape_html(project.challenges)
    );
    let _ = write!(
        html,
        "<div class=\"detail-section\"><h3>Results</h3><p>{}</p></div>",
        escape_html(project.results)
    );

    html.push_str("</div></div>");
    html
}

//! Fixture documents following the analysis-document conventions.

/// Analysis document with every constitution section (brownfield-complete).
pub const SAMPLE_CONSTITUTION_DOC: &str = "\
# Project Analysis

## Purpose

Gearshift turns reverse-engineered documentation into structured specifications that teams can review, extend and implement with confidence.

## Core Values

- Clarity over cleverness
- Specifications before code
- Every change is reviewable
- Automate the boring parts

## Technical Stack

- Languages: Rust, TypeScript
- Frameworks: Axum, React
- Databases: PostgreSQL
- Infrastructure: Docker, Kubernetes
- Build Tools: Cargo, pnpm

## Code Quality

- All code passes lint checks before merge
- Functions stay small and focused

## Testing

- Unit tests accompany every module

## Security

- Secrets never live in the repository

## Documentation

Public APIs are documented with examples.

## Performance

- API p95 latency under 200ms

## Scalability

- Handles 10k concurrent users

## Governance

- Amendments require approval from two maintainers
- The constitution follows semantic versioning
- Compliance review happens every quarter
";

/// Features document with three features and a trailing non-feature section.
pub const SAMPLE_FEATURES_DOC: &str = "\
# Features

## User Authentication

Users can sign up and sign in with email and password.

As a visitor, I want to create an account, so that I can save my work.

- As a user, I want to log in, so that I can access my data.

### Acceptance Criteria

- [x] Sign up form validates email
- [x] Passwords are hashed

## Data Export

Users can export their projects to portable file formats.

As an analyst, I want to export projects, so that I can report offline.

### Acceptance Criteria

- [x] CSV export works
- [ ] JSON export works
- Export is logged

### Technical Requirements

- Dependency: csv crate for serialization
- Endpoint: GET /api/export
- Database: export_jobs table
- Component: ExportButton
- File: src/export/mod.rs
- Must finish within 30 seconds

## Notifications

Users receive email notifications about project activity.

Depends on: Data Export

### Dependencies

- User Authentication

## Non-Functional Requirements

### Uptime

The service stays available.
";

/// Debt document covering the three sample features.
pub const SAMPLE_DEBT_DOC: &str = "\
# Technical Debt Analysis

## User Authentication

Status: Complete

## Data Export

What exists:
- CSV export of projects

What's missing:
- JSON export
- Scheduled exports

## Notifications

❌ Missing
";

/// Minimal single-feature document.
pub const LOGIN_FEATURE_DOC: &str = "# Title\n\n## Features\n\n### Login\n\nLets users sign in.\n\nAs a user, I want to log in, so that I can access my data.\n\n**Acceptance Criteria:**\n- [x] Can submit credentials\n- [ ] Can recover password\n";

/// Debt document marking `Login` as partially implemented.
pub const LOGIN_DEBT_DOC: &str =
    "## Login\n\nWhat exists:\n- login form\n\nWhat's missing:\n- password recovery\n";
